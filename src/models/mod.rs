pub mod ambulance;
pub mod doctor;
pub mod emergency;
pub mod enums;

pub use ambulance::*;
pub use doctor::*;
pub use emergency::*;
pub use enums::*;
