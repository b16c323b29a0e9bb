//! Form validation, run before anything touches the store. Failures come back
//! as a field -> message map for inline rendering; this module never errors
//! for the caller.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::Category;

pub type FieldErrors = BTreeMap<&'static str, String>;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub struct ProblemForm<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
}

pub struct AccountForm<'a> {
    pub email: &'a str,
    pub password: &'a str,
    /// Only checked when supplied at signup.
    pub display_name: Option<&'a str>,
}

pub fn validate_problem(form: &ProblemForm) -> Result<Category, FieldErrors> {
    let mut errors = FieldErrors::new();

    let title_len = form.title.chars().count();
    if !(10..=200).contains(&title_len) {
        errors.insert(
            "title",
            if title_len < 10 {
                "Title must be at least 10 characters".to_owned()
            } else {
                "Title must be less than 200 characters".to_owned()
            },
        );
    }

    let description_len = form.description.chars().count();
    if !(50..=5000).contains(&description_len) {
        errors.insert(
            "description",
            if description_len < 50 {
                "Description must be at least 50 characters".to_owned()
            } else {
                "Description must be less than 5000 characters".to_owned()
            },
        );
    }

    let category = Category::parse(form.category);
    if category.is_none() {
        errors.insert("category", "Please select a category".to_owned());
    }

    match category {
        Some(category) if errors.is_empty() => Ok(category),
        _ => Err(errors),
    }
}

pub fn validate_account(form: &AccountForm) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if !EMAIL_RE.is_match(form.email) {
        errors.insert("email", "Please enter a valid email address".to_owned());
    }

    if form.password.chars().count() < 6 {
        errors.insert("password", "Password must be at least 6 characters".to_owned());
    }

    if let Some(name) = form.display_name {
        if name.chars().count() < 2 {
            errors.insert("display_name", "Name must be at least 2 characters".to_owned());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_problem() -> (String, String, &'static str) {
        ("A clear problem title".to_owned(), "d".repeat(60), "technology")
    }

    #[test]
    fn valid_problem_passes() {
        let (title, description, category) = valid_problem();
        let form = ProblemForm { title: &title, description: &description, category };
        assert_eq!(validate_problem(&form).unwrap(), Category::Technology);
    }

    #[test]
    fn each_violation_keys_its_own_field() {
        let (title, description, category) = valid_problem();

        let short_title = ProblemForm { title: "too short", description: &description, category };
        let errs = validate_problem(&short_title).unwrap_err();
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec![&"title"]);

        let long_title = "t".repeat(201);
        let errs = validate_problem(&ProblemForm {
            title: &long_title,
            description: &description,
            category,
        })
        .unwrap_err();
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec![&"title"]);

        let short_desc = "d".repeat(49);
        let errs = validate_problem(&ProblemForm {
            title: &title,
            description: &short_desc,
            category,
        })
        .unwrap_err();
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec![&"description"]);

        let long_desc = "d".repeat(5001);
        let errs = validate_problem(&ProblemForm {
            title: &title,
            description: &long_desc,
            category,
        })
        .unwrap_err();
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec![&"description"]);

        let errs = validate_problem(&ProblemForm {
            title: &title,
            description: &description,
            category: "cooking",
        })
        .unwrap_err();
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec![&"category"]);
    }

    #[test]
    fn boundary_lengths_are_accepted() {
        let title = "t".repeat(10);
        let description = "d".repeat(50);
        assert!(validate_problem(&ProblemForm {
            title: &title,
            description: &description,
            category: "startups",
        })
        .is_ok());

        let title = "t".repeat(200);
        let description = "d".repeat(5000);
        assert!(validate_problem(&ProblemForm {
            title: &title,
            description: &description,
            category: "startups",
        })
        .is_ok());
    }

    #[test]
    fn account_rules() {
        assert!(validate_account(&AccountForm {
            email: "you@example.com",
            password: "secret",
            display_name: Some("Jo"),
        })
        .is_ok());

        let errs = validate_account(&AccountForm {
            email: "not-an-email",
            password: "secret",
            display_name: None,
        })
        .unwrap_err();
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec![&"email"]);

        let errs = validate_account(&AccountForm {
            email: "you@example.com",
            password: "short",
            display_name: None,
        })
        .unwrap_err();
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec![&"password"]);

        let errs = validate_account(&AccountForm {
            email: "you@example.com",
            password: "secret",
            display_name: Some("J"),
        })
        .unwrap_err();
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec![&"display_name"]);

        // Name is optional at signup.
        assert!(validate_account(&AccountForm {
            email: "you@example.com",
            password: "secret",
            display_name: None,
        })
        .is_ok());
    }
}
