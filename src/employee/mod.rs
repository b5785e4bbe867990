mod core;
mod db;

pub use core::{Employee, EmployeeId, NewEmployee, Status};
pub use db::{create_employee_table, get_all_employees, insert_employee};
