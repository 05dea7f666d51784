pub mod legend;
pub mod map_view;
