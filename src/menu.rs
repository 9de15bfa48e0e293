//! Navigation menu shown by the page layout. Built once at startup.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct MenuItem {
    pub icon: &'static str,
    pub text: &'static str,
    pub url: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<&'static str>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MenuSection {
    pub title: &'static str,
    pub menu_var: &'static str,
    pub menu_items: Vec<MenuItem>,
}

fn item(icon: &'static str, text: &'static str, url: &'static str) -> MenuItem {
    MenuItem {
        icon,
        text,
        url,
        target: None,
    }
}

pub fn default_menu() -> Vec<MenuSection> {
    vec![
        MenuSection {
            title: "EF Tokyo School",
            menu_var: "school_menu",
            menu_items: vec![
                item("book-open", "Courses", "/school/courses"),
                item("user", "Teachers", "/school/teachers"),
                item("home", "Rooms", "/school/rooms"),
                item("clock", "Timeslots", "/school/timeslots"),
            ],
        },
        MenuSection {
            title: "Survey Creation",
            menu_var: "survey_menu",
            menu_items: vec![
                item("activity", "Survey Levels", "/survey/levels"),
                item("activity", "Survey Course Groups", "/survey/groups"),
                item("activity", "Survey Tables", "/survey/tables"),
                item("activity", "Survey Images", "/survey/images"),
                item("activity", "Config Survey", "/survey/surveys"),
                item("settings", "Current Survey", "/survey/configs"),
            ],
        },
        MenuSection {
            title: "SPIN Cycle",
            menu_var: "spin_menu",
            menu_items: vec![
                item("monitor", "SPIN Classes", "/spin/spin_classes"),
                item("users", "Students", "/spin/students"),
                item("users", "Selections", "/spin/selections"),
                item("calendar", "Assignments", "/spin/assignments"),
                item("layout-dashboard", "Dashboard", "/"),
            ],
        },
        MenuSection {
            title: "Student",
            menu_var: "student_menu",
            menu_items: vec![MenuItem {
                target: Some("_blank"),
                ..item("file-text", "Survey", "/survey/surveys")
            }],
        },
        MenuSection {
            title: "Teacher",
            menu_var: "teacher_menu",
            menu_items: vec![item("calendar", "Timeslots", "/school/timeslots")],
        },
    ]
}
