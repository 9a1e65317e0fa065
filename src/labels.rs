use log::debug;

use crate::data_model::{DataModel, SceneSurface};
use crate::scene::ObjectKind;

/// Swaps two mutually exclusive text labels: `hide` leaves the scene if
/// present, `show` joins it.
pub fn swap_labels<S: SceneSurface + ?Sized>(surface: &S, hide: &str, show: &str) {
    if surface.contains_object(hide) {
        surface.remove_object(hide);
        debug!("label {hide} hidden");
    }
    if !surface.add_object(show) {
        debug!("label {show} is not part of the scene");
    }
}

/// Texts of every label currently attached, in scene order.
pub fn visible_labels(model: &DataModel) -> Vec<String> {
    model
        .attached_objects()
        .into_iter()
        .filter(|object| object.kind == ObjectKind::Label)
        .filter_map(|object| object.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObject;

    fn label(name: &str, text: &str, attached: bool) -> SceneObject {
        SceneObject {
            name: name.into(),
            kind: ObjectKind::Label,
            text: Some(text.into()),
            attached,
            ..SceneObject::default()
        }
    }

    #[test]
    fn swap_keeps_at_most_one_prompt() {
        let model = DataModel::from_objects(vec![
            label("press-b", "Press B", true),
            label("press-r", "Press R", false),
        ]);
        swap_labels(&model, "press-b", "press-r");
        assert_eq!(visible_labels(&model), ["Press R"]);
        swap_labels(&model, "press-b", "press-r");
        assert_eq!(visible_labels(&model), ["Press R"]);
        swap_labels(&model, "press-r", "press-b");
        assert_eq!(visible_labels(&model), ["Press B"]);
    }
}
