use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::server::api::{self, ApiError};
use crate::server::AppState;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn json(body: String) -> Self {
        HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Pure request router: no sockets involved, so it is callable directly from tests.
/// `path` may carry a query string.
pub fn route_request(method: &str, path: &str, body: &str, state: &AppState) -> HttpResponse {
    let route = path.split('?').next().unwrap_or(path);
    match (method, route) {
        ("GET", "/") => HttpResponse {
            status_code: 200,
            status_text: "OK",
            content_type: "text/html; charset=utf-8",
            body: index_html(),
        },
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/monsters") => match api::monsters_payload(&state.registry) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/skills") => match api::skills_payload(&state.registry) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => error_response(500, "Internal Server Error", &err.to_string()),
        },
        ("GET", "/api/venom") => match api::venom_payload(&state.registry, path) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => api_error_response(&err),
        },
        ("POST", "/api/simulate") => match api::simulate_payload(body, state) {
            Ok(payload) => HttpResponse::json(payload),
            Err(err) => api_error_response(&err),
        },
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

fn api_error_response(err: &ApiError) -> HttpResponse {
    let (status_code, status_text) = err.status();
    if status_code >= 500 {
        tracing::error!(error = %err, "request failed");
    }
    let message = if status_code >= 500 {
        with_sources(err)
    } else {
        err.to_string()
    };
    error_response(status_code, status_text, &message)
}

fn with_sources(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

pub fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}

fn index_html() -> String {
    r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>nshot</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 900px; margin: 24px auto; padding: 0 12px; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin: 14px 0; }
    label { display:block; margin: 8px 0 4px; font-weight: 600; }
    input, select { width: 100%; padding: 8px; box-sizing: border-box; }
    button { margin-top: 12px; padding: 8px 14px; }
    pre { background: #111; color: #aef2ae; padding: 12px; overflow: auto; border-radius: 6px; min-height: 180px; }
  </style>
</head>
<body>
  <h1>nshot</h1>
  <p>Casts-to-kill estimator. Runs a Monte Carlo simulation on the server.</p>

  <div class="card">
    <label for="monster">Monster</label>
    <select id="monster"></select>
    <label for="skill">Skill</label>
    <select id="skill"></select>
    <label for="level">Skill level</label>
    <input id="level" type="number" min="1" value="30" />
    <label for="atk-min">Attack min</label>
    <input id="atk-min" type="number" min="1" value="1000" />
    <label for="atk-max">Attack max</label>
    <input id="atk-max" type="number" min="1" value="1500" />
    <label for="venom">Venom level (0 = off)</label>
    <input id="venom" type="number" min="0" max="30" value="0" />
    <label for="luk">LUK / DEX / STR</label>
    <div style="display:flex;gap:8px;">
      <input id="luk" type="number" min="0" value="300" />
      <input id="dex" type="number" min="0" value="25" />
      <input id="str" type="number" min="0" value="4" />
    </div>
    <label for="sims">Trials</label>
    <input id="sims" type="number" min="1" max="100000" value="10000" />
    <div><button id="run-btn">POST /api/simulate</button></div>
  </div>

  <pre id="output">Ready.</pre>

  <script>
    const output = document.getElementById('output');
    const num = id => Math.max(0, Math.floor(Number(document.getElementById(id).value) || 0));

    fetch('/api/monsters').then(r => r.json()).then(data => {
      const sel = document.getElementById('monster');
      data.monsters.forEach(m => sel.add(new Option(m.name + ' (HP ' + m.hp + ')', m.id)));
    });
    fetch('/api/skills').then(r => r.json()).then(data => {
      const sel = document.getElementById('skill');
      data.skills.forEach(s => sel.add(new Option(s.name, s.id)));
    });

    document.getElementById('run-btn').addEventListener('click', async () => {
      output.textContent = 'Simulating…';
      const payload = {
        monster: document.getElementById('monster').value,
        skill: document.getElementById('skill').value,
        skill_level: num('level'),
        atk_min: num('atk-min'),
        atk_max: num('atk-max'),
        venom_level: num('venom'),
        str: num('str'), dex: num('dex'), luk: num('luk'),
        sims: Math.max(1, Math.min(100000, num('sims') || 10000)),
      };
      const response = await fetch('/api/simulate', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(payload),
      });
      const text = await response.text();
      if (!response.ok) { output.textContent = 'HTTP ' + response.status + '\n' + text; return; }
      const j = JSON.parse(text);
      const lines = j.summary.rows.map(r =>
        String(r.casts).padStart(4) + ' casts  ' + '#'.repeat(Math.round(r.bar_width / 4)).padEnd(26) + r.percent.toFixed(2) + '%');
      lines.push('', 'Expected: ' + j.summary.expected_casts.toFixed(2) + ' casts', 'Trials: ' + j.summary.trials);
      output.textContent = lines.join('\n');
    });
  </script>
</body>
</html>
"#
    .to_string()
}
