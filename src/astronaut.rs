use std::time::Duration;

use glam::Vec3;
use log::debug;

use crate::data_model::SceneSurface;
use crate::input::Command;

pub const STEP: f32 = 5.0;
pub const JUMP_HEIGHT: f32 = 15.0;
pub const JUMP_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Front,
    Back,
    Left,
    Right,
}

/// Single-shot timer that lowers the astronaut after a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTimer {
    pub started_at: Duration,
    pub duration: Duration,
}

impl JumpTimer {
    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.started_at + self.duration
    }
}

/// Keyboard controlled character.
///
/// Jumps are not guarded against each other: every trigger raises the
/// astronaut and schedules its own fall.
#[derive(Debug, Clone)]
pub struct Astronaut {
    name: String,
    position: Vec3,
    facing: Facing,
    jumps: Vec<JumpTimer>,
}

impl Astronaut {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            position,
            facing: Facing::Front,
            jumps: Vec::new(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn pending_jumps(&self) -> &[JumpTimer] {
        &self.jumps
    }

    /// Applies a movement command. Returns `false` for commands that are not
    /// for the astronaut.
    pub fn handle<S: SceneSurface + ?Sized>(
        &mut self,
        command: Command,
        now: Duration,
        surface: &S,
    ) -> bool {
        match command {
            Command::MoveForward => self.step(Facing::Front, Vec3::Z * STEP),
            Command::MoveBack => self.step(Facing::Back, Vec3::NEG_Z * STEP),
            Command::MoveLeft => self.step(Facing::Left, Vec3::X * STEP),
            Command::MoveRight => self.step(Facing::Right, Vec3::NEG_X * STEP),
            Command::Jump => {
                self.position.y += JUMP_HEIGHT;
                self.jumps.push(JumpTimer {
                    started_at: now,
                    duration: JUMP_DURATION,
                });
                debug!("astronaut jumped ({} in flight)", self.jumps.len());
            }
            _ => return false,
        }
        surface.set_position(&self.name, self.position);
        true
    }

    /// Fires every due jump timer and mirrors the position into the scene.
    pub fn update<S: SceneSurface + ?Sized>(&mut self, now: Duration, surface: &S) -> usize {
        let before = self.jumps.len();
        self.jumps.retain(|timer| !timer.is_due(now));
        let fired = before - self.jumps.len();
        self.position.y -= JUMP_HEIGHT * fired as f32;
        surface.set_position(&self.name, self.position);
        fired
    }

    fn step(&mut self, facing: Facing, delta: Vec3) {
        self.facing = facing;
        self.position += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::DataModel;
    use crate::scene::SceneObject;

    const START: Vec3 = Vec3::new(160.0, -95.0, 0.0);

    fn scene() -> DataModel {
        DataModel::from_objects(vec![SceneObject {
            name: "astronaut".into(),
            position: START,
            ..SceneObject::default()
        }])
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn wasd_moves_and_turns() {
        let model = scene();
        let mut astronaut = Astronaut::new("astronaut", START);
        astronaut.handle(Command::MoveForward, ms(0), &model);
        assert_eq!(astronaut.facing(), Facing::Front);
        astronaut.handle(Command::MoveLeft, ms(0), &model);
        assert_eq!(astronaut.facing(), Facing::Left);
        astronaut.handle(Command::MoveRight, ms(0), &model);
        astronaut.handle(Command::MoveRight, ms(0), &model);
        assert_eq!(astronaut.facing(), Facing::Right);
        astronaut.handle(Command::MoveBack, ms(0), &model);
        assert_eq!(astronaut.facing(), Facing::Back);
        let expected = START + Vec3::new(-5.0, 0.0, 0.0);
        assert_eq!(astronaut.position(), expected);
        assert_eq!(model.get("astronaut").unwrap().position, expected);
        assert!(!astronaut.handle(Command::Launch, ms(0), &model));
    }

    #[test]
    fn jump_falls_back_after_delay() {
        let model = scene();
        let mut astronaut = Astronaut::new("astronaut", START);
        astronaut.handle(Command::Jump, ms(1000), &model);
        assert_eq!(astronaut.position().y, -80.0);
        assert_eq!(astronaut.update(ms(1499), &model), 0);
        assert_eq!(astronaut.position().y, -80.0);
        assert_eq!(astronaut.update(ms(1500), &model), 1);
        assert_eq!(astronaut.position(), START);
        assert!(astronaut.pending_jumps().is_empty());
    }

    #[test]
    fn overlapping_jumps_each_fall_back() {
        let model = scene();
        let mut astronaut = Astronaut::new("astronaut", START);
        astronaut.handle(Command::Jump, ms(0), &model);
        astronaut.handle(Command::Jump, ms(200), &model);
        assert_eq!(astronaut.position().y, -65.0);
        astronaut.update(ms(500), &model);
        assert_eq!(astronaut.position().y, -80.0);
        astronaut.update(ms(700), &model);
        assert_eq!(astronaut.position().y, -95.0);
        assert_eq!(model.get("astronaut").unwrap().position, START);
    }
}
