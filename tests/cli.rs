use assert_cmd::prelude::*;
use once_cell::sync::Lazy;
use predicates::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::{NamedTempFile, TempDir};

/// Minimal layout whose rocket model does not exist on disk.
static BARE_SCENE: Lazy<String> = Lazy::new(|| {
    let camera = |name: &str, position: &str| {
        format!(
            "<object><name>{name}</name><type>camera</type>\
             <position>{position}</position><target>0 0 0</target></object>"
        )
    };
    format!(
        "<scene>{}{}{}\
         <object><name>rocket</name><type>model</type><mesh>models/missing.obj</mesh>\
         <position>-160 -60 0</position></object>\
         <object><name>astronaut</name><shape>box 10 20 10</shape>\
         <position>160 -95 0</position></object>\
         <object><name>golden-donut</name><shape>torus 50 10</shape></object>\
         </scene>",
        camera("normal-camera", "0 0 300"),
        camera("rocket-camera", "-160 0 300"),
        camera("mars-camera", "-900 600 -1400"),
    )
});

fn scene_file(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp scene");
    tmp.write_all(xml.as_bytes()).expect("write scene");
    tmp
}

fn headless(args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("rocket-scene").expect("binary exists");
    cmd.arg("--summary-only").args(args);
    cmd
}

#[test]
fn default_scene_launches_on_first_frame() {
    headless(&["--frames", "1", "--keys", "b@0"])
        .assert()
        .success()
        .stdout(contains("Loaded scene with 19 objects (3 lights)"))
        .stdout(contains(" - rocket (model)"))
        .stdout(contains("Rocket: y=-58.96 speed=1.04 launched=true"))
        .stdout(contains("Press R to land rocket!"))
        .stdout(contains(" - rocket (model) pos=(-160.00, -58.96, 0.00)"))
        .stdout(contains(" - rocket-flame (mesh) pos=(-160.00, -98.96, 0.00)\n"));
}

#[test]
fn rocket_lands_back_on_the_floor() {
    headless(&["--frames", "200", "--keys", "b@0,r@30"])
        .assert()
        .success()
        .stdout(contains("Rocket: y=-63.00 speed=0.00 launched=false"))
        .stdout(contains("Visible labels: Press B to blast off!"))
        .stdout(contains(" - rocket-flame (mesh) pos=(-160.00, -100.00, 0.00) hidden"));
}

#[test]
fn camera_key_cycles_views() {
    headless(&["--frames", "3", "--keys", "c@0,C@2"])
        .assert()
        .success()
        .stdout(contains("Active camera: mars"));
}

#[test]
fn astronaut_jump_falls_back() {
    headless(&["--frames", "10", "--keys", "space@0,w@0"])
        .assert()
        .success()
        .stdout(contains(" - astronaut (model) pos=(160.00, -80.00, 5.00)"));
    headless(&["--frames", "40", "--keys", "space@0"])
        .assert()
        .success()
        .stdout(contains(" - astronaut (model) pos=(160.00, -95.00, 0.00)"));
}

#[test]
fn missing_model_is_skipped() {
    let scene = scene_file(&BARE_SCENE);
    let assets = TempDir::new().expect("asset dir");
    headless(&["--frames", "1", "--keys", "b@0"])
        .arg("--scene")
        .arg(scene.path())
        .arg("--assets")
        .arg(assets.path())
        .assert()
        .success()
        .stdout(contains("Loaded scene with 6 objects (0 lights)"))
        .stdout(contains("Rocket: y=-58.96 speed=1.04 launched=true"))
        .stdout(contains(" - rocket (model) pos=").not());
}

#[test]
fn invalid_scene_is_reported() {
    let scene = scene_file("<scene><object><type>mesh</type></object></scene>");
    headless(&[])
        .arg("--scene")
        .arg(scene.path())
        .assert()
        .failure()
        .stderr(contains("failed to parse scene"));
}

#[test]
fn unknown_key_is_rejected() {
    headless(&["--keys", "tab@1"])
        .assert()
        .failure()
        .stderr(contains("unknown key"));
}
