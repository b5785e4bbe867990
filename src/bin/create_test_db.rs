use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use comp_dashboard::{NewEmployee, Status, initialize_db, insert_employee};

/// A utility for creating a test database for the compensation dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test employees...");

    let employees = demo_employees();
    for employee in &employees {
        insert_employee(employee, &conn)?;
    }

    println!("Created {} employees.", employees.len());
    println!("Success!");

    Ok(())
}

fn demo_employees() -> Vec<NewEmployee> {
    let employee = |name: &str,
                    role: &str,
                    location: &str,
                    experience_years: f64,
                    compensation: f64| NewEmployee {
        name: Some(name.to_owned()),
        role: Some(role.to_owned()),
        location: Some(location.to_owned()),
        experience_years: Some(experience_years),
        compensation: Some(compensation),
        status: Status::Active,
        last_working_day: None,
    };

    let mut employees = vec![
        employee("Aarav Sharma", "Engineer", "Bengaluru", 0.5, 900_000.0),
        employee("Diya Patel", "Engineer", "Bengaluru", 3.0, 1_800_000.0),
        employee("Kabir Singh", "Senior Associate", "Mumbai", 6.0, 2_400_000.0),
        employee("Meera Iyer", "Analyst", "Pune", 1.5, 750_000.0),
        employee("Rohan Gupta", "Manager", "Mumbai", 12.0, 4_200_000.0),
        employee("Sara Khan", "Analyst", "Pune", 0.5, 650_000.0),
        employee("Vikram Rao", "Director", "Bengaluru", 22.0, 7_500_000.0),
    ];

    employees.push(NewEmployee {
        status: Status::Inactive,
        last_working_day: Some(date!(2024 - 03 - 31)),
        ..employee("Neha Joshi", "Engineer", "Pune", 2.5, 1_200_000.0)
    });
    employees.push(NewEmployee {
        compensation: None,
        ..employee("Arjun Nair", "Senior Associate", "Delhi", 4.0, 0.0)
    });

    employees
}
