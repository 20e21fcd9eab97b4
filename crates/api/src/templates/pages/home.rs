use maud::{html, Markup};

use crate::templates::layouts::{base, PageConfig};

/// Routes listed on the index page, in display order
pub const ROUTES: &[(&str, &str)] = &[
    (
        "/api/v1.0/precipitation",
        "Precipitation by date for the last 12 months of data",
    ),
    ("/api/v1.0/stations", "All weather station ids"),
    (
        "/api/v1.0/tobs",
        "Temperature observations of the most active station for the last 12 months of data",
    ),
    (
        "/api/v1.0/<start>",
        "TMIN, TAVG and TMAX from start (YYYY-MM-DD) onward",
    ),
    (
        "/api/v1.0/<start>/<end>",
        "TMIN, TAVG and TMAX between start and end inclusive",
    ),
];

/// Index page - lists the available API routes
pub fn home_page(api_base: &str) -> Markup {
    let config = PageConfig {
        title: "Climate API",
        api_base,
    };

    base(&config, home_content(api_base))
}

fn home_content(api_base: &str) -> Markup {
    html! {
        h1 { "Welcome to the Climate API!" }
        h2 { "Available Routes:" }
        ul {
            @for (route, description) in ROUTES {
                li {
                    // Templated routes aren't directly followable
                    @if route.contains('<') {
                        code { (route) }
                    } @else {
                        a href=(format!("{}{}", api_base, route)) { code { (route) } }
                    }
                    " - " (description)
                }
            }
        }
    }
}
