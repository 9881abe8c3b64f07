/// Get the version string for reg and libreg
pub fn get_version_string() -> String {
    format!(
        "reg {}\nlibreg {}",
        env!("CARGO_PKG_VERSION"),
        libreg::version()
    )
}

/// Print version information to stdout
pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
