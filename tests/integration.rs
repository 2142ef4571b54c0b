#[path = "integration/check.rs"]
mod check;
#[path = "integration/print_type.rs"]
mod print_type;
