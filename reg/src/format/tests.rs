use super::*;
use crate::context::CliOverrides;
use libreg::Config;

fn ctx(color: ColorChoice, verbosity: VerbosityLevel) -> AppContext {
    AppContext::from_config(
        Config::default(),
        CliOverrides {
            color: Some(color),
            ..Default::default()
        },
        verbosity,
    )
}

#[test]
fn test_use_tty_explicit_choices() {
    assert!(use_tty(ColorChoice::Always));
    assert!(!use_tty(ColorChoice::Never));
}

#[test]
fn test_use_tty_respects_no_color_env() {
    unsafe {
        std::env::set_var("NO_COLOR", "1");
    }
    assert!(!use_tty(ColorChoice::Auto));
    unsafe {
        std::env::remove_var("NO_COLOR");
    }
}

#[test]
fn test_should_print_hierarchy() {
    use VerbosityLevel::*;

    assert!(!should_print(Normal, Normal));
    assert!(!should_print(Normal, Verbose));
    assert!(should_print(Verbose, Verbose));
    assert!(!should_print(Verbose, VeryVerbose));
    assert!(should_print(VeryVerbose, Verbose));
    assert!(should_print(VeryVerbose, VeryVerbose));
    assert!(!should_print(VeryVerbose, Normal));
}

#[test]
fn test_plain_progress_bar_is_hidden() {
    let ctx = ctx(ColorChoice::Never, VerbosityLevel::Normal);
    let pb = progress_bar(&ctx, 10, "Fetching manifests");

    assert!(pb.is_hidden());
    pb.inc(1);
    finish_progress(&ctx, pb);
}

#[test]
fn test_tty_progress_bar_length() {
    let pb = TtyFormatter.progress_bar(7, "Fetching manifests");
    assert_eq!(pb.length(), Some(7));
    TtyFormatter.finish_progress(pb);
}

#[test]
fn test_messages_do_not_panic() {
    let ctx = ctx(ColorChoice::Never, VerbosityLevel::VeryVerbose);
    error(&ctx, "error message");
    warning(&ctx, "warning message");
    print(&ctx, VerbosityLevel::Verbose, "debug message");
}
