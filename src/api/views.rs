use crate::models::{Movie, MovieList};

/// Escapes text for use in HTML content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            color: #333;
            margin: 0 auto;
            max-width: 1100px;
            padding: 20px;
        }}
        .movies {{
            display: flex;
            flex-wrap: wrap;
            gap: 16px;
        }}
        .movie {{
            width: 185px;
        }}
        .movie img {{
            display: block;
            width: 185px;
            border-radius: 4px;
        }}
        .meta {{
            color: #7f8c8d;
            font-size: 14px;
        }}
        .overview {{
            font-size: 13px;
            line-height: 1.4;
        }}
        .button {{
            padding: 12px 30px;
            background: #3498db;
            color: white;
            border: none;
            border-radius: 4px;
            font-weight: 600;
            margin: 20px 0;
        }}
    </style>
</head>
<body>
    <h1>{title}</h1>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    )
}

fn movie_card(movie: &Movie, poster_base_url: &str, input: Option<&str>) -> String {
    let title = escape_html(movie.title());

    let poster = movie
        .poster_path()
        .map(|path| {
            format!(
                r#"<img src="{}{}" alt="{}">"#,
                escape_html(poster_base_url),
                escape_html(path.trim_start_matches('/')),
                title
            )
        })
        .unwrap_or_default();

    let mut meta = Vec::new();
    if let Some(year) = movie.release_year() {
        meta.push(year.to_string());
    }
    if let Some(vote) = movie.vote_average() {
        meta.push(format!("&#9733; {:.1}", vote));
    }

    let overview = movie
        .overview()
        .map(|o| format!(r#"<p class="overview">{}</p>"#, escape_html(o)))
        .unwrap_or_default();

    let label = match input {
        Some(name) => format!(
            r#"<label><input type="checkbox" name="{}" value="{}"> {}</label>"#,
            name, movie.id, title
        ),
        None => format!("<strong>{}</strong>", title),
    };

    format!(
        r#"        <div class="movie" data-id="{id}">
            {poster}
            {label}
            <div class="meta">{meta}</div>
            {overview}
        </div>
"#,
        id = movie.id,
        poster = poster,
        label = label,
        meta = meta.join(" &middot; "),
        overview = overview,
    )
}

/// Home page: the curated movie set as a form of checkboxes posting to `/show/`
pub fn render_home(movies: &MovieList, poster_base_url: &str) -> String {
    let cards: String = movies
        .iter()
        .map(|movie| movie_card(movie, poster_base_url, Some("movies")))
        .collect();

    let body = format!(
        r#"    <p>Pick the movies you like and get similar ones.</p>
    <form method="post" action="/show/">
    <div class="movies">
{cards}    </div>
    <button class="button" type="submit">Recommend</button>
    </form>"#
    );

    layout("Pick your movies", &body)
}

/// Recommendations page
pub fn render_recommendations(movies: &[Movie], poster_base_url: &str) -> String {
    let cards: String = movies
        .iter()
        .map(|movie| movie_card(movie, poster_base_url, None))
        .collect();

    let content = if movies.is_empty() {
        "    <p>No recommendations found for this selection.</p>\n".to_string()
    } else {
        format!("    <div class=\"movies\">\n{cards}    </div>\n")
    };

    let body = format!(r#"{content}    <p><a href="/">Back to the movie list</a></p>"#);

    layout("Recommended for you", &body)
}
