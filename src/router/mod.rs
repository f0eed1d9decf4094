//! Request routing: map a method and path to one of the fixed handlers.
//!
//! The routing table is static and evaluated top to bottom; the first matching
//! rule wins:
//!
//! | Method | Pattern              | Route                |
//! |--------|----------------------|----------------------|
//! | `GET`  | prefix `/echo`       | [`Route::Echo`]      |
//! | `GET`  | prefix `/user-agent` | [`Route::UserAgent`] |
//! | `GET`  | prefix `/files`      | [`Route::FileRead`]  |
//! | `POST` | prefix `/files`      | [`Route::FileWrite`] |
//! | any    | exactly `/`          | [`Route::Root`]      |
//!
//! Anything else resolves to [`Route::NotFound`]. Prefix matching is plain string
//! prefix matching, so `/echo-anything` also takes the echo route.

use tracing::debug;

use crate::handlers;
use crate::http::{Method, Request, Response, StatusCode};
use crate::store::FileStore;

/// The handler selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Echo,
    UserAgent,
    FileRead,
    FileWrite,
    /// `200 OK` with an empty body; no handler runs.
    Root,
    /// `404 Not Found` with an empty body.
    NotFound,
}

// Compiled representation of a route pattern.
#[derive(Debug, Clone, Copy)]
enum Pattern {
    // Matches one exact path string, e.g. `/`.
    Exact(&'static str),
    // Matches any path that starts with the given string, e.g. `/files`.
    Prefix(&'static str),
}

impl Pattern {
    fn matches(self, path: &str) -> bool {
        match self {
            Pattern::Exact(p) => path == p,
            Pattern::Prefix(p) => path.starts_with(p),
        }
    }
}

// A single rule binding an optional method + pattern to a route.
struct Rule {
    // `None` matches every method.
    method: Option<Method>,
    pattern: Pattern,
    route: Route,
}

static RULES: [Rule; 5] = [
    Rule {
        method: Some(Method::Get),
        pattern: Pattern::Prefix("/echo"),
        route: Route::Echo,
    },
    Rule {
        method: Some(Method::Get),
        pattern: Pattern::Prefix("/user-agent"),
        route: Route::UserAgent,
    },
    Rule {
        method: Some(Method::Get),
        pattern: Pattern::Prefix("/files"),
        route: Route::FileRead,
    },
    Rule {
        method: Some(Method::Post),
        pattern: Pattern::Prefix("/files"),
        route: Route::FileWrite,
    },
    Rule {
        method: None,
        pattern: Pattern::Exact("/"),
        route: Route::Root,
    },
];

impl Rule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().is_none_or(|m| m == method) && self.pattern.matches(path)
    }
}

/// Resolves a method and path to a [`Route`].
///
/// Pure and reentrant; no state is consulted beyond the static rule table.
///
/// # Examples
///
/// ```
/// use courier::http::Method;
/// use courier::router::{Route, resolve};
///
/// assert_eq!(resolve(&Method::Get, "/echo/hi"), Route::Echo);
/// assert_eq!(resolve(&Method::Post, "/files/a"), Route::FileWrite);
/// assert_eq!(resolve(&Method::Post, "/echo/hi"), Route::NotFound);
/// ```
pub fn resolve(method: &Method, path: &str) -> Route {
    RULES
        .iter()
        .find(|rule| rule.matches(method, path))
        .map_or(Route::NotFound, |rule| rule.route)
}

/// Dispatches decoded requests to handlers, owning the file store they share.
///
/// A `Router` is immutable once built and is shared by every connection task.
#[derive(Debug, Clone)]
pub struct Router<S> {
    store: S,
}

impl<S: FileStore> Router<S> {
    /// Creates a router whose file routes use `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the file store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves `request` and runs the selected handler.
    ///
    /// Always produces a response; unmatched requests become `404 Not Found`.
    pub async fn dispatch(&self, request: &Request) -> Response {
        let route = resolve(request.method(), request.path());
        debug!(
            method = %request.method(),
            path = request.path(),
            route = ?route,
            "dispatching request"
        );

        match route {
            Route::Echo => handlers::echo(request.path()),
            Route::UserAgent => handlers::user_agent(request),
            Route::FileRead => handlers::read_file(&self.store, request.path()).await,
            Route::FileWrite => handlers::write_file(&self.store, request).await,
            Route::Root => Response::new(StatusCode::Ok),
            Route::NotFound => Response::new(StatusCode::NotFound),
        }
    }
}
