//! One module per shell screen. Screens draw from borrowed state and report
//! user intent back to the app as small action enums.

pub mod admin;
pub mod catalog;
pub mod certificate;
pub mod course;
pub mod dashboard;
pub mod login;
