use traced_error::{ResultExt, StackTracerExt, TracedError, format_err, with_message, wrap};

fn parse_port(raw: &str) -> Result<u16, TracedError> {
    raw.parse::<u16>()
        .wrap_err_with(|| format!("invalid port `{raw}`"))
}

fn load_settings() -> Result<u16, TracedError> {
    let port = parse_port("80a")?;
    if port == 0 {
        return Err(format_err!("port {port} is reserved"));
    }
    Ok(port)
}

fn main() {
    let Err(err) = load_settings() else {
        return;
    };

    // `with_message` keeps the trace recorded in `parse_port`.
    let err = with_message(err, "loading settings");
    println!("Display: {err}");
    println!("Chain:\n{}", err.to_chain());
    println!("Stack trace:\n{}", err.stack_trace());

    // `wrap` records a new one here.
    let err = wrap(err, "starting server");
    println!("\nDebug: {err:?}");
}
