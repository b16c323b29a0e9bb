use std::{collections::HashSet, sync::Arc};

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    cache::{QueryCache, QueryKey},
    db::Solution,
    include_res, res, session, store, AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn detail(
    Path(id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    State(cache): State<Arc<QueryCache>>,
    session: Session,
) -> AppResult<Response> {
    let user = session::current_profile(&session, &db_pool).await?;
    let user_id = user.as_ref().map(|p| p.id);
    let signed_in = user_id.is_some();

    let problem = cache
        .get_or_fetch(QueryKey::Problem(id), || store::get_problem(&db_pool, id))
        .await?;
    let Some(problem) = problem else {
        let body = include_res!(str, "/pages/notice.html")
            .replace("{title}", "Problem not found")
            .replace("{message}", "This problem may have been removed or doesn't exist.");
        return Ok((StatusCode::NOT_FOUND, Html(body)).into_response());
    };

    let solutions = cache
        .get_or_fetch(QueryKey::Solutions(id), || store::list_solutions(&db_pool, id))
        .await?;

    // The set of solutions this user has upvoted; upvote rows are the sole
    // source of truth for that.
    let upvoted: HashSet<Uuid> = match user_id {
        Some(user_id) => cache
            .get_or_fetch(QueryKey::UserUpvotes(user_id), || {
                store::user_upvotes(&db_pool, user_id)
            })
            .await?
            .into_iter()
            .map(|u| u.solution_id)
            .collect(),
        None => HashSet::new(),
    };

    let top_solution = solutions
        .first()
        .filter(|s| s.upvotes_count > 0)
        .map(|s| s.id);

    let solution_cards: String = if solutions.is_empty() {
        r#"<p class="empty-state">No solutions yet. Be the first to contribute a solution to this problem!</p>"#.to_owned()
    } else {
        solutions
            .iter()
            .map(|s| solution_card(s, upvoted.contains(&s.id), top_solution == Some(s.id), signed_in))
            .collect()
    };

    let solution_form = if signed_in {
        include_res!(str, "/pages/problems/solution_form.html")
            .replace("{problem_id}", &id.to_string())
    } else {
        r#"<p>You need to be signed in to submit a solution.</p>
           <a class="button" href="/auth">Sign In to Contribute</a>"#
            .to_owned()
    };

    let body = include_res!(str, "/pages/problems/detail.html")
        .replace("{nav}", &res::navbar(user.as_ref()))
        .replace("{title}", &res::escape_html(&problem.title))
        .replace("{description}", &res::escape_html(&problem.description))
        .replace("{category}", problem.category.as_str())
        .replace("{category_label}", problem.category.label())
        .replace("{upvotes}", &problem.upvotes_count.to_string())
        .replace("{solutions_count}", &problem.solutions_count.to_string())
        .replace(
            "{author}",
            &res::escape_html(problem.author_name.as_deref().unwrap_or("Anonymous")),
        )
        .replace("{ago}", &res::time_ago(problem.created_at))
        .replace("{solution_form}", &solution_form)
        .replace("{solution_list}", &solution_cards);

    Ok(Html(body).into_response())
}

fn solution_card(
    solution: &Solution,
    has_upvoted: bool,
    is_top: bool,
    signed_in: bool,
) -> String {
    let upvote_control = if signed_in {
        format!(
            r#"<form method="post" action="/solutions/{}/upvote">
                 <input type="hidden" name="has_upvoted" value="{has_upvoted}">
                 <button class="upvote{}">&#9650; {}</button>
               </form>"#,
            solution.id,
            if has_upvoted { " upvoted" } else { "" },
            solution.upvotes_count,
        )
    } else {
        // Signed-out users get a sign-in link instead of a live control.
        format!(
            r#"<a class="upvote disabled" href="/auth">&#9650; {}</a>"#,
            solution.upvotes_count
        )
    };

    include_res!(str, "/pages/problems/solution.html")
        .replace("{top_badge}", if is_top { r#"<span class="badge">Top Solution</span>"# } else { "" })
        .replace("{content}", &res::markdown_to_html(&solution.content))
        .replace(
            "{author}",
            &res::escape_html(solution.author_name.as_deref().unwrap_or("Anonymous")),
        )
        .replace("{ago}", &res::time_ago(solution.created_at))
        .replace("{upvote_control}", &upvote_control)
}
