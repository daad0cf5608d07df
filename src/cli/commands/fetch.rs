//! Handlers for `godesk list` and `godesk get`.

use super::{binding_options, into_response, parse_pair, parse_value, with_path_variables, Session};
use crate::api;
use crate::binding::{poll_every, RequestBinding};
use crate::cli::render::render;
use crate::cli::{AcceptArg, GetArgs, ListArgs};
use crate::error::Error;
use crate::filter::{FilterController, SortState};
use crate::request::{ContentKind, Payload, Query, RequestOptions};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub async fn list(args: &ListArgs, session: &Session) -> Result<(), Error> {
    let info = api::lookup(&args.endpoint)?;
    if !info.paginated {
        return Err(Error::config(format!(
            "'{}' is not a list endpoint; use `godesk get {}`",
            info.name, info.name
        )));
    }

    let page_size = args.page_size.unwrap_or(session.config.page_size);
    let mut controller = FilterController::new(Query::new(), page_size);
    for raw in &args.filters {
        let (name, value) = parse_pair(raw, "filter")?;
        controller.set_filter_field(parse_value(&value), |filter| {
            filter.entry(name).or_insert(Value::Null)
        });
    }
    if let Some(sort) = &args.sort {
        let sort: SortState = sort.parse()?;
        controller.set_sort_state(sort.column, sort.direction);
    }
    controller.set_page(args.page);
    debug!(
        filtered = controller.filtered(),
        page = controller.page(),
        offset = controller.offset(),
        "list {}",
        info.name
    );

    let descriptor = with_path_variables(info.descriptor(), info, &args.request.vars)?
        .with_query_map(controller.query()?)
        .with_options(RequestOptions {
            enforce_english_for_query: args.english,
            ..RequestOptions::default()
        });

    let mut options = binding_options::<Value>(args.request.retries);
    let Some(interval) = args.poll else {
        let binding = RequestBinding::with_options(
            session.transport.clone(),
            descriptor.clone(),
            options,
        );
        let response = into_response(binding.settled().await?, info, &descriptor)?;
        println!("{}", render(&response, session.format)?);
        return Ok(());
    };

    options = options.with_poll(poll_every(interval));
    let binding =
        RequestBinding::with_options(session.transport.clone(), descriptor.clone(), options);
    let mut receiver = binding.subscribe();
    let mut shown = 0;
    loop {
        let state = receiver.borrow_and_update().clone();
        if !state.pending {
            let response = into_response(state, info, &descriptor)?;
            println!("{}", render(&response, session.format)?);
            shown += 1;
            if shown >= args.poll_count {
                return Ok(());
            }
        }
        receiver
            .changed()
            .await
            .map_err(|_| anyhow::anyhow!("request binding closed"))?;
    }
}

const fn content_kind(accept: AcceptArg) -> ContentKind {
    match accept {
        AcceptArg::Json => ContentKind::Json,
        AcceptArg::Csv => ContentKind::Csv,
        AcceptArg::Xlsx => ContentKind::Spreadsheet,
    }
}

pub async fn get(args: &GetArgs, session: &Session) -> Result<(), Error> {
    let info = api::lookup(&args.endpoint)?;
    let mut descriptor = with_path_variables(info.descriptor(), info, &args.request.vars)?
        .with_options(RequestOptions {
            content: content_kind(args.accept),
            enforce_english_for_query: args.english,
            ..RequestOptions::default()
        });
    for raw in &args.query {
        let (name, value) = parse_pair(raw, "query")?;
        descriptor = descriptor.with_query(name, parse_value(&value));
    }

    let binding = RequestBinding::<Payload>::with_options(
        session.transport.clone(),
        descriptor.clone(),
        binding_options(args.request.retries),
    );
    let payload = into_response(binding.settled().await?, info, &descriptor)?;

    match (payload, &args.output) {
        (Payload::Json(value), None) => println!("{}", render(&value, session.format)?),
        (Payload::Json(value), Some(path)) => {
            write_output(path, serde_json::to_string_pretty(&value)?.as_bytes()).await?;
        }
        (Payload::Text(text), None) => println!("{text}"),
        (Payload::Text(text), Some(path)) => write_output(path, text.as_bytes()).await?,
        (Payload::Blob(bytes), Some(path)) => write_output(path, &bytes).await?,
        (Payload::Blob(bytes), None) => {
            return Err(Error::config(format!(
                "Response is a {} byte binary file; write it with --output <PATH>",
                bytes.len()
            )));
        }
    }
    Ok(())
}

async fn write_output(path: &Path, contents: &[u8]) -> Result<(), Error> {
    tokio::fs::write(path, contents).await?;
    eprintln!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
