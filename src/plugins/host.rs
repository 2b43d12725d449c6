// src/plugins/host.rs — Host functions exposed to plugin scripts
//
// Scripts get rhai's standard packages plus the helpers below. Nothing here
// restricts what a script may do; plugins run with the privileges of the
// host process.

use std::sync::Arc;
use std::time::Duration;

use rhai::{Dynamic, Engine, EvalAltResult, Map};

use crate::net::http::{HttpClient, HttpResponse};

/// Knobs for building the plugin engine.
#[derive(Clone, Default)]
pub struct HostOptions {
    /// Operation ceiling per script call. 0 = unlimited.
    pub max_operations: u64,
    /// HTTP helper; the `http_*` functions are only registered when present.
    pub http: Option<Arc<HttpClient>>,
}

/// Create the engine shared by every script plugin.
pub fn create_plugin_engine(options: &HostOptions) -> Engine {
    let mut engine = Engine::new();

    if options.max_operations > 0 {
        engine.set_max_operations(options.max_operations);
    }

    engine.register_fn("log", |msg: &str| {
        tracing::info!(target: "plugin", "{}", msg);
    });
    engine.register_fn("log_debug", |msg: &str| {
        tracing::debug!(target: "plugin", "{}", msg);
    });
    engine.register_fn("log_warn", |msg: &str| {
        tracing::warn!(target: "plugin", "{}", msg);
    });

    engine.register_fn("sleep", |ms: i64| {
        std::thread::sleep(Duration::from_millis(ms.max(0) as u64));
    });
    engine.register_fn("now", || chrono::Utc::now().to_rfc3339());

    engine.register_fn("url_join", url_join);
    engine.register_fn("append_uri", append_uri);
    engine.register_fn("hostname", hostname);
    engine.register_fn("build_url", build_url);
    engine.register_fn("to_json", |value: Dynamic| -> Result<String, Box<EvalAltResult>> {
        to_json(&value).map_err(Into::into)
    });

    if let Some(ref http) = options.http {
        register_http(&mut engine, http);
    }

    engine
}

fn register_http(engine: &mut Engine, http: &Arc<HttpClient>) {
    let client = Arc::clone(http);
    engine.register_fn("http_get", move |url: &str| -> Result<Map, Box<EvalAltResult>> {
        into_script(client.get(url, &[]))
    });

    let client = Arc::clone(http);
    engine.register_fn(
        "http_get",
        move |url: &str, headers: Map| -> Result<Map, Box<EvalAltResult>> {
            into_script(client.get(url, &header_pairs(&headers)))
        },
    );

    let client = Arc::clone(http);
    engine.register_fn(
        "http_post",
        move |url: &str, body: &str| -> Result<Map, Box<EvalAltResult>> {
            into_script(client.post(url, body, &[]))
        },
    );

    let client = Arc::clone(http);
    engine.register_fn(
        "http_post",
        move |url: &str, body: &str, headers: Map| -> Result<Map, Box<EvalAltResult>> {
            into_script(client.post(url, body, &header_pairs(&headers)))
        },
    );

    let client = Arc::clone(http);
    engine.register_fn(
        "http_post_json",
        move |url: &str, body: Dynamic| -> Result<Map, Box<EvalAltResult>> {
            post_json(&client, url, &body, &Map::new())
        },
    );

    let client = Arc::clone(http);
    engine.register_fn(
        "http_post_json",
        move |url: &str, body: Dynamic, headers: Map| -> Result<Map, Box<EvalAltResult>> {
            post_json(&client, url, &body, &headers)
        },
    );

    let client = Arc::clone(http);
    engine.register_fn(
        "http_put",
        move |url: &str, body: &str| -> Result<Map, Box<EvalAltResult>> {
            into_script(client.put(url, body, &[]))
        },
    );

    let client = Arc::clone(http);
    engine.register_fn("http_delete", move |url: &str| -> Result<Map, Box<EvalAltResult>> {
        into_script(client.delete(url, &[]))
    });
}

fn post_json(
    client: &HttpClient,
    url: &str,
    body: &Dynamic,
    headers: &Map,
) -> Result<Map, Box<EvalAltResult>> {
    let payload = to_json(body)?;
    let mut pairs = header_pairs(headers);
    if !pairs
        .iter()
        .any(|(k, _)| k.eq_ignore_ascii_case("content-type"))
    {
        pairs.push(("Content-Type".into(), "application/json".into()));
    }
    into_script(client.post(url, &payload, &pairs))
}

/// Serialize a script value (map, array, scalar) as JSON.
pub fn to_json(value: &Dynamic) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("cannot encode JSON body: {e}"))
}

fn header_pairs(headers: &Map) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn into_script(result: anyhow::Result<HttpResponse>) -> Result<Map, Box<EvalAltResult>> {
    match result {
        Ok(resp) => Ok(response_to_map(resp)),
        Err(e) => Err(format!("{e:#}").into()),
    }
}

fn response_to_map(resp: HttpResponse) -> Map {
    let mut headers = Map::new();
    for (k, v) in resp.headers {
        headers.insert(k.into(), Dynamic::from(v));
    }

    let mut map = Map::new();
    map.insert("status".into(), Dynamic::from(resp.status as i64));
    map.insert("body".into(), Dynamic::from(resp.body));
    map.insert("headers".into(), Dynamic::from(headers));
    map
}

/// Join `path` onto the path component of `base`. Returns "" if `base` is not
/// a valid URL.
pub fn url_join(base: &str, path: &str) -> String {
    let Ok(mut url) = url::Url::parse(base) else {
        return String::new();
    };
    let joined = append_uri(url.path(), path);
    url.set_path(&joined);
    url.to_string()
}

/// Concatenate two path fragments with exactly one separator between them.
pub fn append_uri(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return if base.is_empty() { "/".into() } else { base.into() };
    }
    format!("{base}/{path}")
}

/// Append `params` to `base` as URL-encoded query pairs, keeping any query
/// already present. Returns "" if `base` is not a valid URL.
pub fn build_url(base: &str, params: Map) -> String {
    let Ok(mut url) = url::Url::parse(base) else {
        return String::new();
    };
    if !params.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in &params {
            query.append_pair(key, &value.to_string());
        }
    }
    url.to_string()
}

/// Host part of a URL, or "" when it has none.
pub fn hostname(target: &str) -> String {
    url::Url::parse(target)
        .ok()
        .and_then(|u| u.host_str().map(String::from))
        .unwrap_or_default()
}
