use anyhow::Error;

pub fn format_error_chain(err: &Error) -> String {
    err.chain()
        .enumerate()
        .map(|(index, cause)| {
            if index == 0 {
                cause.to_string()
            } else {
                format!("       └> {}", cause)
            }
        })
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn print_error_chain(err: &Error) {
    error!("{}", format_error_chain(err));
}
