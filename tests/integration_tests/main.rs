#[path = "../helpers/test_postgres.rs"]
mod test_postgres;

mod persistence;
