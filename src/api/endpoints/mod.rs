pub mod activate;
pub mod assign;
pub mod doctors;
pub mod emergencies;
pub mod health;
pub mod triage;
