pub mod certificates;
pub mod chapters;
pub mod colleges;
pub mod dashboard;
pub mod meetings;
pub mod memberships;
pub mod points;
