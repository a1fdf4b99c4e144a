use odsc_core::EvalService;

use crate::exit_codes::SUCCESS;

pub(crate) async fn run(svc: &EvalService) -> anyhow::Result<i32> {
    let status = svc.storage_status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(SUCCESS)
}
