//! Handler for `godesk submit`.

use super::{binding_options, into_response, parse_pair, with_path_variables, Session};
use crate::api;
use crate::binding::RequestBinding;
use crate::cli::render::render;
use crate::cli::SubmitArgs;
use crate::error::Error;
use crate::request::{Blob, Body, FieldValue, RequestDescriptor, RequestOptions};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;
use tracing::info;

pub async fn submit(args: &SubmitArgs, session: &Session) -> Result<(), Error> {
    let info = api::lookup(&args.endpoint)?;
    let method = match &args.method {
        Some(raw) => raw.parse()?,
        None => info.method,
    };
    if !method.is_mutating() {
        return Err(Error::config(format!(
            "submit sends a body and needs POST, PUT, PATCH or DELETE; use `godesk get {}`",
            info.name
        )));
    }

    let mut descriptor = RequestDescriptor {
        method,
        ..with_path_variables(info.descriptor(), info, &args.request.vars)?
    }
    .with_options(RequestOptions {
        form_data: args.form || !args.files.is_empty(),
        use_current_language_for_mutation: args.current_language,
        ..RequestOptions::default()
    });
    if let Some(body) = read_body(args.data.as_deref(), &args.files).await? {
        descriptor = descriptor.with_body(body);
    }

    let endpoint = info.name;
    let options = binding_options::<Value>(args.request.retries).on_success(move |_| {
        info!(target: "godesk::submit", "{method} {endpoint} accepted");
    });
    let binding =
        RequestBinding::with_options(session.transport.clone(), descriptor.clone(), options);
    let response = into_response(binding.settled().await?, info, &descriptor)?;
    if !response.is_null() {
        println!("{}", render(&response, session.format)?);
    }
    Ok(())
}

/// Builds the request body from `--data` and `--file`.
///
/// Files are merged into the `--data` object; a name given more than once
/// becomes a list of attachments.
async fn read_body(data: Option<&str>, files: &[String]) -> Result<Option<Body>, Error> {
    let json = match data {
        Some(raw) => Some(read_json(raw).await?),
        None => None,
    };
    if files.is_empty() {
        return Ok(json.map(Body::Json));
    }

    let mut fields: IndexMap<String, FieldValue> = match json {
        Some(Value::Object(map)) => map
            .into_iter()
            .map(|(key, value)| (key, FieldValue::Value(value)))
            .collect(),
        Some(other) => {
            return Err(Error::InvalidBody(format!(
                "--file needs --data to be a JSON object, got {other}"
            )));
        }
        None => IndexMap::new(),
    };
    for raw in files {
        let (name, path) = parse_pair(raw, "file")?;
        let blob = read_blob(Path::new(&path)).await?;
        match fields.shift_remove(&name) {
            None => {
                fields.insert(name, FieldValue::Blob(blob));
            }
            Some(FieldValue::List(mut items)) => {
                items.push(FieldValue::Blob(blob));
                fields.insert(name, FieldValue::List(items));
            }
            Some(existing) => {
                fields.insert(name, FieldValue::List(vec![existing, FieldValue::Blob(blob)]));
            }
        }
    }
    Ok(Some(Body::Fields(fields)))
}

async fn read_json(raw: &str) -> Result<Value, Error> {
    let text = match raw.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => raw.to_string(),
    };
    Ok(serde_json::from_str(&text)?)
}

async fn read_blob(path: &Path) -> Result<Blob, Error> {
    let bytes = tokio::fs::read(path).await?;
    let mut blob = Blob::new(bytes);
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        blob = blob.with_file_name(name);
    }
    Ok(blob)
}
