pub mod markup;
pub mod profile;
pub mod roster;
