//! HTML returned to the browser at the end of the OAuth flow.

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::json;

use crate::lark::oauth::LarkUser;

const PLACEHOLDER_AVATAR: &str = "https://via.placeholder.com/80";

const STYLE: &str = "body { font-family: sans-serif; text-align: center; padding: 50px; \
background: linear-gradient(135deg, #ff9800, #ffc107); min-height: 100vh; margin: 0; } \
.card { background: white; padding: 40px; border-radius: 16px; max-width: 400px; margin: 0 auto; \
box-shadow: 0 4px 20px rgba(0,0,0,0.2); } \
.avatar { width: 80px; height: 80px; border-radius: 50%; margin-bottom: 16px; } \
.btn { display: inline-block; padding: 12px 32px; background: #ff9800; color: white; \
text-decoration: none; border-radius: 8px; margin-top: 20px; font-weight: bold; }";

/// JSON is embedded in a `<script>`; `</` must not close it early.
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// Welcome page that stores the signed-in user in `localStorage` for the front end.
pub fn render_login_success(user: &LarkUser, login_at: &str) -> String {
    let avatar = if user.avatar_url.is_empty() {
        PLACEHOLDER_AVATAR
    } else {
        user.avatar_url.as_str()
    };
    let user_json = script_json(&json!({
        "userId": user.id(),
        "openId": user.open_id,
        "unionId": user.union_id,
        "name": user.name,
        "email": user.contact_email(),
        "avatar": user.avatar_url,
        "loginAt": login_at,
    }));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Signed in</title>
  <style>{STYLE}</style>
</head>
<body>
  <div class="card">
    <img class="avatar" src="{avatar}" alt="avatar">
    <h1>Welcome!</h1>
    <p><strong>{name}</strong></p>
    <p>{email}</p>
    <a href="/" class="btn">Start the workbook</a>
  </div>
  <script>
    const userData = {user_json};
    localStorage.setItem('selfUnderstanding_larkUser', JSON.stringify(userData));
    localStorage.setItem('selfUnderstanding_userId', userData.userId);
    localStorage.setItem('selfUnderstanding_userName', userData.name);
    localStorage.setItem('selfUnderstanding_needSync', 'true');
  </script>
</body>
</html>"#,
        avatar = encode_double_quoted_attribute(avatar),
        name = encode_text(&user.name),
        email = encode_text(user.contact_email()),
    )
}

pub fn render_login_error(message: &str) -> String {
    format!(
        "<html><body><h1>Login Error</h1><p>{}</p><a href=\"/\">Back</a></body></html>",
        encode_text(message)
    )
}
