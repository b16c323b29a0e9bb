mod detail;
mod list;
mod solution;
pub mod submit;
mod upvote;

use axum::{routing::{get, post}, Router};

use crate::{db::Problem, include_res, res, AppState};

pub use submit::submit_page;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list).post(submit::create))
        .route("/{id}", get(detail::detail))
        .route("/{id}/solutions", post(solution::post_solution))
}

pub fn upvote_router() -> Router<AppState> {
    Router::new().route("/{id}/upvote", post(upvote::toggle))
}

/// One problem card, shared by the list page and the home page.
pub(crate) fn card(problem: &Problem) -> String {
    include_res!(str, "/pages/problems/card.html")
        .replace("{id}", &problem.id.to_string())
        .replace("{title}", &res::escape_html(&problem.title))
        .replace("{description}", &res::escape_html(&problem.description))
        .replace("{category}", problem.category.as_str())
        .replace("{category_label}", problem.category.label())
        .replace("{upvotes}", &problem.upvotes_count.to_string())
        .replace("{solutions}", &problem.solutions_count.to_string())
        .replace(
            "{author}",
            &res::escape_html(problem.author_name.as_deref().unwrap_or("Anonymous")),
        )
        .replace("{ago}", &res::time_ago(problem.created_at))
}
