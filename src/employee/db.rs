//! Database operations for employees.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    employee::{Employee, EmployeeId, NewEmployee},
};

/// Initialize the employee table.
///
/// The table is append-only: nothing in the application updates or deletes
/// rows.
pub fn create_employee_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS employee (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT,
            location TEXT,
            experience_years REAL CHECK (experience_years IS NULL OR experience_years >= 0),
            compensation REAL CHECK (compensation IS NULL OR compensation >= 0),
            status TEXT NOT NULL,
            last_working_day TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_employee_location ON employee(location);",
    )?;

    Ok(())
}

/// Insert a single employee and return its generated ID.
///
/// # Errors
/// Returns [Error::SqlError] if the row violates a table constraint, e.g.
/// the employee has no name.
pub fn insert_employee(employee: &NewEmployee, connection: &Connection) -> Result<EmployeeId, Error> {
    connection.execute(
        "INSERT INTO employee
            (name, role, location, experience_years, compensation, status, last_working_day)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            &employee.name,
            &employee.role,
            &employee.location,
            employee.experience_years,
            employee.compensation,
            employee.status,
            employee.last_working_day,
        ),
    )?;

    Ok(connection.last_insert_rowid())
}

/// Retrieve every employee in insertion order.
pub fn get_all_employees(connection: &Connection) -> Result<Vec<Employee>, Error> {
    connection
        .prepare(
            "SELECT name, role, location, experience_years, compensation, status
            FROM employee
            ORDER BY id ASC",
        )?
        .query_map([], map_row)?
        .map(|maybe_employee| maybe_employee.map_err(|error| error.into()))
        .collect()
}

fn map_row(row: &Row) -> Result<Employee, rusqlite::Error> {
    Ok(Employee {
        name: row.get(0)?,
        role: row.get(1)?,
        location: row.get(2)?,
        experience_years: row.get(3)?,
        compensation: row.get(4)?,
        status: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        employee::{Employee, NewEmployee, Status},
    };

    use super::{create_employee_table, get_all_employees, insert_employee};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_employee_table(&connection).unwrap();
        connection
    }

    fn new_employee(name: &str) -> NewEmployee {
        NewEmployee {
            name: Some(name.to_owned()),
            role: Some("Engineer".to_owned()),
            location: Some("Pune".to_owned()),
            experience_years: Some(2.5),
            compensation: Some(1_200_000.0),
            status: Status::Active,
            last_working_day: None,
        }
    }

    #[test]
    fn sql_is_valid() {
        let connection = Connection::open_in_memory().unwrap();

        assert_eq!(Ok(()), create_employee_table(&connection));
    }

    #[test]
    fn insert_then_read_back() {
        let connection = get_test_connection();

        insert_employee(&new_employee("Asha"), &connection).unwrap();
        insert_employee(
            &NewEmployee {
                role: None,
                experience_years: None,
                compensation: None,
                status: Status::Inactive,
                last_working_day: Some(date!(2024 - 03 - 31)),
                ..new_employee("Bilal")
            },
            &connection,
        )
        .unwrap();

        let employees = get_all_employees(&connection).unwrap();

        assert_eq!(
            employees,
            vec![
                Employee {
                    name: "Asha".to_owned(),
                    role: Some("Engineer".to_owned()),
                    location: Some("Pune".to_owned()),
                    experience_years: Some(2.5),
                    compensation: Some(1_200_000.0),
                    status: Status::Active,
                },
                Employee {
                    name: "Bilal".to_owned(),
                    role: None,
                    location: Some("Pune".to_owned()),
                    experience_years: None,
                    compensation: None,
                    status: Status::Inactive,
                },
            ]
        );
    }

    #[test]
    fn insert_fails_without_name() {
        let connection = get_test_connection();

        let result = insert_employee(
            &NewEmployee {
                name: None,
                ..new_employee("")
            },
            &connection,
        );

        assert!(matches!(result, Err(Error::SqlError(_))), "got {result:?}");
        assert!(get_all_employees(&connection).unwrap().is_empty());
    }

    #[test]
    fn reads_status_written_by_other_loaders() {
        let connection = get_test_connection();
        connection
            .execute(
                "INSERT INTO employee (name, status) VALUES ('Chen', 'active'), ('Dev', 'Left')",
                (),
            )
            .unwrap();

        let statuses: Vec<Status> = get_all_employees(&connection)
            .unwrap()
            .into_iter()
            .map(|employee| employee.status)
            .collect();

        assert_eq!(statuses, vec![Status::Active, Status::Inactive]);
    }
}
