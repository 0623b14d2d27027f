use form_request::{RequestExecutor, RequestSpec};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let base_url = std::env::var("FORM_REQUEST_BASE_URL")?;

    // FORM_REQUEST_DEBUG=request,verbose prints a trace after every call.
    let executor = RequestExecutor::from_env()?;

    let created = executor
        .post(
            RequestSpec::new(format!("{base_url}/items"))
                .params([("name", "Kit"), ("kind", "cat")]),
        )
        .await?;
    if !created.is_successful() {
        anyhow::bail!(
            "create failed with HTTP {}: {}",
            created.status_code(),
            created.raw_text()
        );
    }

    let listed = executor
        .get(
            RequestSpec::new(format!("{base_url}/items"))
                .param("kind", "cat")
                .max_attempts(3),
        )
        .await?;
    match listed.decoded_result() {
        Some(items) => println!("{items:#}"),
        None => println!("non-JSON body: {}", listed.raw_text()),
    }

    executor
        .delete(RequestSpec::new(format!("{base_url}/items")).param("name", "Kit"))
        .await?
        .emit_debug_trace(&[("Step", "cleanup")], &form_request::WriterSink::stderr());

    Ok(())
}
