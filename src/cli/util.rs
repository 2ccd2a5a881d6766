use super::runner::OutputMode;

pub fn parse_format_input(s: Option<&str>) -> Option<String> {
    s.map(str::to_lowercase)
}

pub fn parse_output_mode(s: Option<&str>) -> OutputMode {
    match parse_format_input(s).as_deref() {
        Some("json") => OutputMode::Json,
        Some("plain") => OutputMode::Plain,
        _ => OutputMode::Human,
    }
}
