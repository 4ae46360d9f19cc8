use std::fmt::Write as _;

use reference::{DataFetchError, DatabaseEntry, PurchaseOrderEntry, ReferenceIndex};
use shared::domain::PHOTO_EXTENSIONS;

const TITLE: &str = "Inbound Monitoring Form";

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:1rem}\
.item{display:flex;gap:1rem;align-items:center;margin:.25rem 0}\
.error{color:#b00020}.success{color:#1b5e20}.debug{color:#555;font-size:.85rem}";

const SUBMIT_SCRIPT: &str = r#"
document.getElementById('submit-form').addEventListener('submit', async (event) => {
  event.preventDefault();
  const status = document.getElementById('status');
  status.replaceChildren();
  const show = (text, cls) => {
    const p = document.createElement('p');
    p.className = cls;
    p.textContent = text;
    status.appendChild(p);
  };
  try {
    const response = await fetch('/submit', { method: 'POST', body: new FormData(event.target) });
    const body = await response.json();
    (body.debug || []).forEach((line) => show(line, 'debug'));
    show(body.message, body.status === 'done' ? 'success' : 'error');
  } catch (err) {
    show('Submission failed: ' + err, 'error');
  }
});
"#;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn page(body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{TITLE}</title><style>{STYLE}</style></head>\
         <body><h1>{TITLE}</h1>{body}</body></html>"
    )
}

pub fn render_load_error(err: &DataFetchError) -> String {
    page(&format!(
        "<p class=\"error\">Failed to load reference data: {}</p>",
        escape_html(&err.to_string())
    ))
}

/// Chosen database and PO: the requested ones when listed, else the first.
pub fn narrow<'a>(
    index: &'a ReferenceIndex,
    database: Option<&str>,
    po_number: Option<&str>,
) -> (Option<&'a DatabaseEntry>, Option<&'a PurchaseOrderEntry>) {
    let database = database
        .and_then(|name| index.database(name))
        .or_else(|| index.entries().first());
    let purchase_order = database.and_then(|entry| {
        po_number
            .and_then(|number| entry.purchase_order(number))
            .or_else(|| entry.purchase_orders.first())
    });
    (database, purchase_order)
}

pub fn render_form(index: &ReferenceIndex, database: Option<&str>, po_number: Option<&str>) -> String {
    let (database, purchase_order) = narrow(index, database, po_number);
    let Some(database) = database else {
        return page("<p class=\"error\">The reference sheet has no rows.</p>");
    };

    let mut body = String::new();
    body.push_str("<form method=\"get\" action=\"/\">");
    body.push_str("<label>Select Database: <select name=\"database\" onchange=\"this.form.po.value='';this.form.submit()\">");
    for name in index.databases() {
        push_option(&mut body, name.as_str(), name == &database.name);
    }
    body.push_str("</select></label>");
    body.push_str("<label>Select PO Number: <select name=\"po\" onchange=\"this.form.submit()\">");
    for entry in &database.purchase_orders {
        let selected = purchase_order.is_some_and(|po| po.number == entry.number);
        push_option(&mut body, entry.number.as_str(), selected);
    }
    body.push_str("</select></label><noscript><button type=\"submit\">Load</button></noscript></form>");

    let Some(purchase_order) = purchase_order else {
        return page(&body);
    };

    body.push_str("<form id=\"submit-form\" method=\"post\" action=\"/submit\" enctype=\"multipart/form-data\">");
    let _ = write!(
        body,
        "<input type=\"hidden\" name=\"database\" value=\"{}\">\
         <input type=\"hidden\" name=\"po_number\" value=\"{}\">",
        escape_html(database.name.as_str()),
        escape_html(purchase_order.number.as_str()),
    );
    body.push_str("<fieldset><legend>Select items received:</legend>");
    // Field names carry the row index only; item names can hold characters
    // that browsers percent-encode in multipart names.
    for (row, item) in purchase_order.items.iter().enumerate() {
        let item = escape_html(item.as_str());
        let _ = write!(
            body,
            "<div class=\"item\"><label><input type=\"checkbox\" name=\"item_{row}\" value=\"{item}\"> {item}</label>\
             <label>Qty received for {item} <input type=\"number\" name=\"qty_{row}\" min=\"0\" step=\"1\" value=\"0\"></label></div>"
        );
    }
    body.push_str("</fieldset>");

    let accept: Vec<String> = PHOTO_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect();
    let _ = write!(
        body,
        "<label>Upload photos (unlimited): <input type=\"file\" name=\"photos\" multiple accept=\"{}\"></label>",
        accept.join(",")
    );
    body.push_str("<p><button type=\"submit\">Submit</button></p></form><div id=\"status\"></div>");
    let _ = write!(body, "<script>{SUBMIT_SCRIPT}</script>");

    page(&body)
}

fn push_option(body: &mut String, value: &str, selected: bool) {
    let value = escape_html(value);
    let selected = if selected { " selected" } else { "" };
    let _ = write!(body, "<option value=\"{value}\"{selected}>{value}</option>");
}
