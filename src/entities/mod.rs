mod location;
mod place;
mod region;

pub use location::Coordinates;
pub use place::Place;
pub use region::Region;
