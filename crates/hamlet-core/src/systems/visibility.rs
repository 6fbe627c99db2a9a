//! Visibility system - villagers vanish indoors

use hecs::World;

use crate::components::{Brain, Visibility};

/// Hide villagers that are at home and show everyone else.
pub fn visibility_system(world: &mut World) {
    for (_entity, (visibility, brain)) in world.query_mut::<(&mut Visibility, &Brain)>() {
        visibility.visible = !brain.at_home;
    }
}
