//! Authentication endpoints: signup, login and logout.

use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use validator::Validate;
use yatube_common::{AppError, AppResult};
use yatube_core::{LoginInput, SignupInput};

use crate::{
    extractors::{MaybeAuthUser, safe_next},
    middleware::{AppState, SESSION_COOKIE},
    response::{FormErrors, FormView, Found, page},
};

/// Signup form values echoed back; passwords never are.
#[derive(Debug, Default, Serialize)]
struct SignupFields {
    first_name: String,
    last_name: String,
    username: String,
    email: String,
}

impl From<&SignupInput> for SignupFields {
    fn from(input: &SignupInput) -> Self {
        Self {
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            username: input.username.clone(),
            email: input.email.clone(),
        }
    }
}

#[derive(Serialize)]
struct SignupPage {
    form: FormView<SignupFields>,
}

#[derive(Debug, Default, Serialize)]
struct LoginFields {
    username: String,
}

#[derive(Serialize)]
struct LoginPage {
    form: FormView<LoginFields>,
    next: Option<String>,
}

#[derive(Serialize)]
struct LoggedOutPage {
    logged_out: bool,
}

/// `?next=` on the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Submitted login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

async fn signup_form() -> Response {
    page(SignupPage {
        form: FormView::new(SignupFields::default()),
    })
}

/// Register, log in and go home.
async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<SignupInput>,
) -> AppResult<Response> {
    let fields = SignupFields::from(&input);
    if let Err(errors) = input.validate() {
        return Ok(page(SignupPage {
            form: FormView::with_errors(fields, FormErrors::from_validation(&errors)),
        }));
    }

    match state.user_service.signup(input).await {
        Ok(session) => {
            let jar = jar.add(session_cookie(session.token));
            Ok((jar, Found::to("/")).into_response())
        }
        Err(AppError::Validation(message)) => Ok(page(SignupPage {
            form: FormView::with_errors(fields, FormErrors::from_message(&message)),
        })),
        Err(e) => Err(e),
    }
}

async fn login_form(Query(query): Query<NextQuery>) -> Response {
    page(LoginPage {
        form: FormView::new(LoginFields::default()),
        next: query.next,
    })
}

/// Open a session and return to `next`.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let input = LoginInput {
        username: form.username,
        password: form.password,
    };

    match state.user_service.login(&input).await {
        Ok(session) => {
            tracing::info!(user_id = %session.user.id, "Logged in");
            let jar = jar.add(session_cookie(session.token));
            Ok((jar, Found::to(safe_next(form.next.as_deref()))).into_response())
        }
        Err(AppError::Unauthorized) => Ok(page(LoginPage {
            form: FormView::with_errors(
                LoginFields {
                    username: input.username,
                },
                FormErrors::non_field(
                    "Please enter a correct username and password. Note that both fields may be case-sensitive.",
                ),
            ),
            next: form.next,
        })),
        Err(e) => Err(e),
    }
}

/// End the session.
async fn logout(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    jar: CookieJar,
) -> AppResult<Response> {
    if let Some(user) = viewer.0 {
        state.user_service.logout(&user.id).await?;
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, page(LoggedOutPage { logged_out: true })).into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup/", get(signup_form).post(signup))
        .route("/auth/login/", get(login_form).post(login))
        .route("/auth/logout/", get(logout).post(logout))
}
