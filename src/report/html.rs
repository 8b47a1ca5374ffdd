//! Self-contained interactive timeline document.
//!
//! The figure data is embedded as JSON and drawn by a small inline canvas
//! script: hover readout, legend toggling, drag to zoom, double-click to
//! reset. No network access is needed to open the file.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::create_file;
use crate::color::{to_hex, PLOT_BACKGROUND};
use crate::error::{ExportError, PlotError};
use crate::figure::TimelineFigure;

#[derive(Serialize)]
struct HtmlSeries<'a> {
    name: &'a str,
    color: String,
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Serialize)]
struct HtmlFigure<'a> {
    title: &'a str,
    /// Unix milliseconds of x = 0, timestamps are shown as UTC wall time.
    start_ms: i64,
    background: String,
    series: Vec<HtmlSeries<'a>>,
}

/// Render the complete HTML document for a timeline.
pub fn render_timeline_html(figure: &TimelineFigure) -> Result<String, PlotError> {
    let data = HtmlFigure {
        title: &figure.title,
        start_ms: figure.start.and_utc().timestamp_millis(),
        background: to_hex(PLOT_BACKGROUND),
        series: figure
            .series
            .iter()
            .map(|s| HtmlSeries {
                name: &s.name,
                color: to_hex(s.color),
                x: s.points.iter().map(|p| p[0]).collect(),
                y: s.points.iter().map(|p| p[1]).collect(),
            })
            .collect(),
    };
    // Keep the payload from closing the script element.
    let json = serde_json::to_string(&data)?.replace("</", "<\\/");

    let title = escape_html(&figure.title);
    Ok(fill_template(
        TEMPLATE,
        &[("__TITLE__", title.as_str()), ("__DATA__", json.as_str())],
    ))
}

/// Substitute placeholders in one pass; inserted text is never rescanned.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((pos, key, value)) = values
        .iter()
        .filter_map(|&(key, value)| rest.find(key).map(|pos| (pos, key, value)))
        .min_by_key(|&(pos, _, _)| pos)
    {
        out.push_str(&rest[..pos]);
        out.push_str(value);
        rest = &rest[pos + key.len()..];
    }
    out.push_str(rest);
    out
}

/// Write the interactive timeline document.
pub fn write_timeline_html(path: &Path, figure: &TimelineFigure) -> Result<(), ExportError> {
    let document = render_timeline_html(figure)?;
    let mut out = create_file(path)?;
    out.write_all(document.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| ExportError::from_io(path, e))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<style>
  body { margin: 0; font-family: sans-serif; background: #fff; }
  h1 { font-size: 18px; font-weight: normal; margin: 12px 16px; }
  #wrap { position: relative; margin: 0 16px; }
  canvas { display: block; width: 100%; height: 75vh; }
  #legend { margin: 8px 16px; }
  #legend span { cursor: pointer; margin-right: 16px; user-select: none; }
  #legend span.off { opacity: 0.35; }
  #tip { position: absolute; pointer-events: none; background: #fff; border: 1px solid #888;
         padding: 2px 6px; font-size: 12px; display: none; white-space: nowrap; }
</style>
</head>
<body>
<h1>__TITLE__</h1>
<div id="wrap"><canvas id="plot"></canvas><div id="tip"></div></div>
<div id="legend"></div>
<script>
const FIG = __DATA__;
const MONTHS = ["Jan","Feb","Mar","Apr","May","Jun","Jul","Aug","Sep","Oct","Nov","Dec"];
const pad = n => String(n).padStart(2, "0");
function fmtTime(x) {
  const d = new Date(FIG.start_ms + x * 1000);
  return pad(d.getUTCDate()) + " " + MONTHS[d.getUTCMonth()] + " " + d.getUTCFullYear() +
    ", " + pad(d.getUTCHours()) + ":" + pad(d.getUTCMinutes());
}
const hidden = new Set();
const canvas = document.getElementById("plot");
const tip = document.getElementById("tip");
const ctx = canvas.getContext("2d");
const M = { l: 70, r: 20, t: 10, b: 40 };
let view = null;

function fullRange() {
  let x0 = Infinity, x1 = -Infinity, y0 = Infinity, y1 = -Infinity;
  FIG.series.forEach((s, i) => {
    if (hidden.has(i)) return;
    s.x.forEach((x, j) => {
      x0 = Math.min(x0, x); x1 = Math.max(x1, x);
      y0 = Math.min(y0, s.y[j]); y1 = Math.max(y1, s.y[j]);
    });
  });
  if (!isFinite(x0)) return { x0: 0, x1: 1, y0: 0, y1: 1 };
  if (x0 === x1) x1 = x0 + 1;
  const m = (y1 - y0) * 0.05 || 1;
  return { x0, x1, y0: y0 - m, y1: y1 + m };
}
function ticks(a, b, n) {
  const step = Math.pow(10, Math.floor(Math.log10((b - a) / n)));
  const err = (b - a) / n / step;
  const s = step * (err >= 5 ? 5 : err >= 2 ? 2 : 1);
  const out = [];
  for (let v = Math.ceil(a / s) * s; v <= b; v += s) out.push(v);
  return out;
}
function draw() {
  const dpr = window.devicePixelRatio || 1;
  const w = canvas.clientWidth, h = canvas.clientHeight;
  canvas.width = w * dpr; canvas.height = h * dpr;
  ctx.setTransform(dpr, 0, 0, dpr, 0, 0);
  ctx.clearRect(0, 0, w, h);
  const v = view || fullRange();
  const pw = w - M.l - M.r, ph = h - M.t - M.b;
  const sx = x => M.l + (x - v.x0) / (v.x1 - v.x0) * pw;
  const sy = y => M.t + ph - (y - v.y0) / (v.y1 - v.y0) * ph;
  ctx.fillStyle = FIG.background;
  ctx.fillRect(M.l, M.t, pw, ph);
  ctx.strokeStyle = "#fff"; ctx.fillStyle = "#444"; ctx.font = "12px sans-serif";
  ctx.textAlign = "right";
  ticks(v.y0, v.y1, 8).forEach(t => {
    ctx.beginPath(); ctx.moveTo(M.l, sy(t)); ctx.lineTo(M.l + pw, sy(t)); ctx.stroke();
    ctx.fillText(+t.toFixed(6), M.l - 6, sy(t) + 4);
  });
  ctx.textAlign = "center";
  ticks(v.x0, v.x1, 6).forEach(t => {
    ctx.beginPath(); ctx.moveTo(sx(t), M.t); ctx.lineTo(sx(t), M.t + ph); ctx.stroke();
    ctx.fillText(fmtTime(t), sx(t), M.t + ph + 18);
  });
  ctx.save();
  ctx.beginPath(); ctx.rect(M.l, M.t, pw, ph); ctx.clip();
  FIG.series.forEach((s, i) => {
    if (hidden.has(i)) return;
    ctx.strokeStyle = s.color; ctx.lineWidth = 1.5; ctx.beginPath();
    s.x.forEach((x, j) => j ? ctx.lineTo(sx(x), sy(s.y[j])) : ctx.moveTo(sx(x), sy(s.y[j])));
    ctx.stroke();
  });
  ctx.restore();
  return { v, sx, sy, pw, ph };
}
let geo = draw();
const legend = document.getElementById("legend");
FIG.series.forEach((s, i) => {
  const el = document.createElement("span");
  el.innerHTML = "<b style='color:" + s.color + "'>&#9472;&#9472;</b> ";
  el.appendChild(document.createTextNode(s.name));
  el.onclick = () => { hidden.has(i) ? hidden.delete(i) : hidden.add(i); el.classList.toggle("off"); geo = draw(); };
  legend.appendChild(el);
});
let dragFrom = null;
canvas.onmousedown = e => { dragFrom = e.offsetX; };
canvas.onmouseup = e => {
  if (dragFrom !== null && Math.abs(e.offsetX - dragFrom) > 5) {
    const inv = px => geo.v.x0 + (px - M.l) / geo.pw * (geo.v.x1 - geo.v.x0);
    const a = inv(Math.min(dragFrom, e.offsetX)), b = inv(Math.max(dragFrom, e.offsetX));
    const base = fullRange();
    view = { x0: a, x1: b, y0: base.y0, y1: base.y1 };
    geo = draw();
  }
  dragFrom = null;
};
canvas.ondblclick = () => { view = null; geo = draw(); };
canvas.onmousemove = e => {
  let best = null;
  FIG.series.forEach((s, i) => {
    if (hidden.has(i)) return;
    s.x.forEach((x, j) => {
      const d = Math.hypot(geo.sx(x) - e.offsetX, geo.sy(s.y[j]) - e.offsetY);
      if (!best || d < best.d) best = { d, s, x, y: s.y[j] };
    });
  });
  if (best && best.d < 30) {
    tip.style.display = "block";
    tip.style.left = (e.offsetX + 12) + "px"; tip.style.top = (e.offsetY + 12) + "px";
    tip.textContent = best.s.name + ": " + fmtTime(best.x) + " " + best.y;
  } else {
    tip.style.display = "none";
  }
};
canvas.onmouseleave = () => { tip.style.display = "none"; };
window.onresize = () => { geo = draw(); };
</script>
</body>
</html>
"##;
