pub mod buses;
pub mod classes;
pub mod dashboard;
pub mod fees;
pub mod payments;
pub mod periods;
pub mod schedules;
pub mod students;
pub mod subjects;
pub mod teachers;
