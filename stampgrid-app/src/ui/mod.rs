pub(crate) mod detail;
pub(crate) mod eras;
pub(crate) mod hud;
pub(crate) mod minimap;
pub(crate) mod search_bar;
pub(crate) mod toolbar;
