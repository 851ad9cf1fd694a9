//! HTML pages. Every page takes the view context explicitly; all dynamic
//! text goes through `escape_html`.

use axum::response::Html;
use std::fmt::Write as _;

use crate::contract::model::{Job, Session};

/// What every page needs to know about the visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewContext {
    pub is_authenticated: bool,
    pub username: Option<String>,
}

impl ViewContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(s) if s.is_authenticated() => Self {
                is_authenticated: true,
                username: s.username.clone(),
            },
            _ => Self::anonymous(),
        }
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn nav(ctx: &ViewContext) -> String {
    let links = if ctx.is_authenticated {
        r#"<li><a href="/dashboard">Dashboard</a></li>
        <li><a href="/logout">Logout</a></li>"#
    } else {
        r#"<li><a href="/login">Login</a></li>
        <li><a href="/register">Register</a></li>"#
    };
    format!(
        r#"<header class="site-header">
    <a class="brand" href="/">Job Board</a>
    <button class="hamburger-menu" type="button" aria-label="Toggle navigation">
      <span></span><span></span><span></span>
    </button>
    <nav class="main-nav">
      <ul>
        <li><a href="/">Home</a></li>
        {links}
      </ul>
    </nav>
  </header>"#
    )
}

fn alert(class: &str, text: Option<&str>) -> String {
    text.map(|t| format!(r#"<p class="alert {class}">{}</p>"#, escape_html(t)))
        .unwrap_or_default()
}

fn layout(title: &str, ctx: &ViewContext, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta name="viewport" content="width=device-width, initial-scale=1"/>
  <title>{title} | Job Board</title>
  <link rel="stylesheet" href="/static/style.css">
</head>
<body>
  {nav}
  <main class="container">
{body}
  </main>
  <script src="/static/script.js"></script>
</body>
</html>"#,
        title = escape_html(title),
        nav = nav(ctx),
    ))
}

pub fn home(ctx: &ViewContext) -> Html<String> {
    let cta = if ctx.is_authenticated {
        r#"<a class="button" href="/dashboard">Go to your dashboard</a>"#
    } else {
        r#"<a class="button" href="/register">Create an account</a>
    <a class="button secondary" href="/login">Log in</a>"#
    };
    layout(
        "Home",
        ctx,
        &format!(
            r#"    <h1>Find your next job</h1>
    <p>Browse the latest postings from companies that are hiring.</p>
    {cta}"#
        ),
    )
}

pub fn login(ctx: &ViewContext, error: Option<&str>) -> Html<String> {
    layout(
        "Login",
        ctx,
        &format!(
            r#"    <h1>Login</h1>
    {error}
    <form method="post" action="/login">
      <label for="email">Email</label>
      <input id="email" name="email" type="email" required>
      <label for="password">Password</label>
      <input id="password" name="password" type="password" required>
      <button type="submit">Log in</button>
    </form>
    <p><a href="/forgot-password">Forgot your password?</a></p>
    <p>No account yet? <a href="/register">Register</a></p>"#,
            error = alert("error", error),
        ),
    )
}

pub fn register(ctx: &ViewContext, error: Option<&str>) -> Html<String> {
    layout(
        "Register",
        ctx,
        &format!(
            r#"    <h1>Register</h1>
    {error}
    <form method="post" action="/register">
      <label for="username">Username</label>
      <input id="username" name="username" type="text" required>
      <label for="email">Email</label>
      <input id="email" name="email" type="email" required>
      <label for="password">Password</label>
      <input id="password" name="password" type="password" minlength="6" required>
      <button type="submit">Create account</button>
    </form>
    <p>Already registered? <a href="/login">Log in</a></p>"#,
            error = alert("error", error),
        ),
    )
}

fn job_card(job: &Job) -> String {
    let mut meta = escape_html(&job.company);
    if let Some(location) = &job.location {
        let _ = write!(meta, " &middot; {}", escape_html(location));
    }
    if let Some(salary) = job.salary {
        let _ = write!(meta, " &middot; {salary}");
    }
    format!(
        r#"      <li class="job">
        <h3>{title}</h3>
        <p class="job-meta">{meta}</p>
        <p>{description}</p>
        <time datetime="{iso}">{date}</time>
      </li>
"#,
        title = escape_html(&job.title),
        description = escape_html(&job.description),
        iso = job.created_at.to_rfc3339(),
        date = job.created_at.format("%Y-%m-%d"),
    )
}

pub fn dashboard(ctx: &ViewContext, jobs: &[Job], error: Option<&str>) -> Html<String> {
    let username = escape_html(ctx.username.as_deref().unwrap_or_default());
    let listing = if jobs.is_empty() {
        r#"    <p class="empty">No job postings yet.</p>"#.to_string()
    } else {
        let items: String = jobs.iter().map(job_card).collect();
        format!("    <ul class=\"jobs\">\n{items}    </ul>")
    };
    layout(
        "Dashboard",
        ctx,
        &format!(
            r#"    <h1>Welcome, {username}!</h1>
    {error}
    <h2>Recent jobs</h2>
{listing}"#,
            error = alert("error", error),
        ),
    )
}

pub fn forgot_password(
    ctx: &ViewContext,
    message: Option<&str>,
    error: Option<&str>,
) -> Html<String> {
    layout(
        "Forgot Password",
        ctx,
        &format!(
            r#"    <h1>Forgot your password?</h1>
    {message}{error}
    <form method="post" action="/forgot-password">
      <label for="email">Email</label>
      <input id="email" name="email" type="email" required>
      <button type="submit">Send reset link</button>
    </form>
    <p><a href="/login">Back to login</a></p>"#,
            message = alert("success", message),
            error = alert("error", error),
        ),
    )
}

pub fn reset_password(
    ctx: &ViewContext,
    token: &str,
    message: Option<&str>,
    error: Option<&str>,
) -> Html<String> {
    layout(
        "Reset Password",
        ctx,
        &format!(
            r#"    <h1>Reset your password</h1>
    {message}{error}
    <form method="post" action="/reset-password">
      <input type="hidden" name="token" value="{token}">
      <label for="password">New password</label>
      <input id="password" name="password" type="password" minlength="6" required>
      <label for="confirm_password">Confirm password</label>
      <input id="confirm_password" name="confirm_password" type="password" minlength="6" required>
      <button type="submit">Reset password</button>
    </form>"#,
            token = escape_html(token),
            message = alert("success", message),
            error = alert("error", error),
        ),
    )
}

pub fn not_found(ctx: &ViewContext) -> Html<String> {
    layout(
        "Page Not Found",
        ctx,
        r#"    <h1>Page not found</h1>
    <p>The page you are looking for does not exist.</p>
    <p><a href="/">Back to the home page</a></p>"#,
    )
}

pub fn server_error(ctx: &ViewContext) -> Html<String> {
    layout(
        "Error",
        ctx,
        r#"    <h1>Something went wrong</h1>
    <p>Please try again in a moment.</p>"#,
    )
}
