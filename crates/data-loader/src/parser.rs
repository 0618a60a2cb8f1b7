//! Parser for catalog snapshot files.
//!
//! This module handles parsing the `::`-separated .dat files:
//! - genres.dat: genreId::name
//! - movies.dat: movieId::title::release_date::poster_path::vote_average::popularity::genres
//! - ratings.dat: userId::movieId::rating::watched_at[::notes]
//!
//! and the JSON similarity artifact (similarity.json).
//!
//! Every `parse_*` function has a `*_str` twin that works on file content,
//! which is what the unit tests exercise.

use crate::error::{DataLoadError, Result};
use crate::similarity::SimilarityMatrix;
use crate::types::*;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::str::FromStr;

/// Read a file with ISO-8859-1 encoding (Latin-1)
///
/// ISO-8859-1 is a single-byte encoding where each byte maps directly to a
/// Unicode code point, so the conversion is lossless.
fn read_latin1(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Iterate over non-empty trimmed lines with their 1-based line numbers
fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Split a line on "::" and require exactly `expected` fields
fn split_fields<'a>(line: &'a str, expected: usize, line_no: usize) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = line.split("::").collect();
    if fields.len() != expected {
        return Err(DataLoadError::FieldCountMismatch {
            expected,
            found: fields.len(),
            line: line_no,
        });
    }
    Ok(fields)
}

/// Parse one field, attaching file/line context on failure
fn parse_field<T>(value: &str, name: &str, file: &str, line_no: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line: line_no,
        reason: format!("Invalid {}: {}", name, e),
    })
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse the genres.dat file
pub fn parse_genres(path: &Path) -> Result<Vec<Genre>> {
    parse_genres_str(&read_latin1(path)?)
}

pub fn parse_genres_str(content: &str) -> Result<Vec<Genre>> {
    let mut genres = Vec::new();

    for (line_no, line) in data_lines(content) {
        let fields = split_fields(line, 2, line_no)?;
        let name = fields[1].trim();
        if name.is_empty() {
            return Err(DataLoadError::ParseError {
                file: "genres.dat".to_string(),
                line: line_no,
                reason: "Missing genre name".to_string(),
            });
        }

        genres.push(Genre {
            id: parse_field(fields[0], "genreId", "genres.dat", line_no)?,
            name: name.to_string(),
        });
    }

    Ok(genres)
}

/// Parse the movies.dat file
///
/// The release date and poster path may be empty. The genre field is
/// pipe-separated ("Action|Adventure|Sci-Fi") and may also be empty, which
/// gives a movie with no genres.
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    parse_movies_str(&read_latin1(path)?)
}

pub fn parse_movies_str(content: &str) -> Result<Vec<Movie>> {
    let mut movies = Vec::new();

    for (line_no, line) in data_lines(content) {
        let fields = split_fields(line, 7, line_no)?;

        let title = fields[1].trim();
        if title.is_empty() {
            return Err(DataLoadError::ParseError {
                file: "movies.dat".to_string(),
                line: line_no,
                reason: "Missing title".to_string(),
            });
        }
        let release_date = optional_text(fields[2]);
        let year = release_date
            .as_deref()
            .and_then(extract_year_from_date)
            .or_else(|| extract_year_from_title(title));

        movies.push(Movie {
            id: parse_field(fields[0], "movieId", "movies.dat", line_no)?,
            title: title.to_string(),
            year,
            release_date,
            poster_path: optional_text(fields[3]),
            vote_average: parse_vote_average(fields[4], line_no)?,
            popularity: parse_field(fields[5], "popularity", "movies.dat", line_no)?,
            genres: parse_genre_list(fields[6]),
        });
    }

    Ok(movies)
}

/// Parse the ratings.dat file
///
/// The notes field is optional and may itself contain "::".
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    parse_ratings_str(&read_latin1(path)?)
}

pub fn parse_ratings_str(content: &str) -> Result<Vec<Rating>> {
    let mut ratings = Vec::new();

    for (line_no, line) in data_lines(content) {
        let mut parts = line.splitn(5, "::");

        let mut next_field = |name: &str| {
            parts.next().ok_or_else(|| DataLoadError::ParseError {
                file: "ratings.dat".to_string(),
                line: line_no,
                reason: format!("Missing {}", name),
            })
        };
        let user_id = next_field("userId")?;
        let movie_id = next_field("movieId")?;
        let rating_value = next_field("rating")?;
        let watched_at = next_field("watched_at")?;
        let notes = parts.next().and_then(optional_text);

        ratings.push(Rating {
            user_id: parse_field(user_id, "userId", "ratings.dat", line_no)?,
            movie_id: parse_field(movie_id, "movieId", "ratings.dat", line_no)?,
            rating: parse_field(rating_value, "rating", "ratings.dat", line_no)?,
            watched_at: parse_field(watched_at, "watched_at", "ratings.dat", line_no)?,
            notes,
        });
    }

    Ok(ratings)
}

/// Load the similarity artifact
///
/// A missing file is not an error: it means no movie is covered.
pub fn parse_similarity(path: &Path) -> Result<SimilarityMatrix> {
    match std::fs::read_to_string(path) {
        Ok(content) => SimilarityMatrix::from_json(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(SimilarityMatrix::empty()),
        Err(e) => Err(e.into()),
    }
}

fn parse_vote_average(value: &str, line_no: usize) -> Result<f32> {
    let vote: f32 = parse_field(value, "vote_average", "movies.dat", line_no)?;
    if !(0.0..=10.0).contains(&vote) {
        return Err(DataLoadError::InvalidValue {
            field: "vote_average".to_string(),
            value: value.trim().to_string(),
        });
    }
    Ok(vote)
}

/// Extract year from a "YYYY-MM-DD" release date
fn extract_year_from_date(date: &str) -> Option<u16> {
    date.get(..4)?.parse().ok()
}

/// Extract year from movie title
///
/// Example: "Toy Story (1995)" -> Some(1995)
///          "Movie Title" -> None
fn extract_year_from_title(title: &str) -> Option<u16> {
    let start = title.rfind('(')?;
    let end = title.rfind(')')?;
    if start < end {
        if let Ok(year) = title[start + 1..end].parse::<u16>() {
            return Some(year);
        }
    }
    None
}

/// Parse pipe-separated genre names
///
/// Example: "Action|Adventure|Sci-Fi" -> ["Action", "Adventure", "Sci-Fi"]
fn parse_genre_list(s: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for name in s.split('|').map(str::trim).filter(|n| !n.is_empty()) {
        if !genres.iter().any(|g| g == name) {
            genres.push(name.to_string());
        }
    }
    genres
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year_from_title("Toy Story (1995)"), Some(1995));
        assert_eq!(extract_year_from_title("Movie Title"), None);
        assert_eq!(extract_year_from_date("1999-03-31"), Some(1999));
        assert_eq!(extract_year_from_date("n/a"), None);
    }

    #[test]
    fn test_parse_genre_list() {
        assert_eq!(
            parse_genre_list("Action|Adventure|Sci-Fi"),
            vec!["Action", "Adventure", "Sci-Fi"]
        );
        assert!(parse_genre_list("").is_empty());
        assert_eq!(parse_genre_list("Drama|Drama"), vec!["Drama"]);
    }

    #[test]
    fn test_parse_genres() {
        let genres = parse_genres_str("1::Drama\n\n2::Comedy\n").unwrap();
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[1].id, 2);
        assert_eq!(genres[1].name, "Comedy");

        assert!(parse_genres_str("x::Drama").is_err());
        assert!(parse_genres_str("3::").is_err());
    }

    #[test]
    fn test_parse_movies() {
        let content = "\
603::The Matrix::1999-03-31::/matrix.jpg::8.2::74.5::Action|Sci-Fi
1::Toy Story (1995)::::::7.9::50.1::
";
        let movies = parse_movies_str(content).unwrap();
        assert_eq!(movies.len(), 2);

        let matrix = &movies[0];
        assert_eq!(matrix.id, 603);
        assert_eq!(matrix.year, Some(1999));
        assert_eq!(matrix.poster_path.as_deref(), Some("/matrix.jpg"));
        assert_eq!(matrix.genres, vec!["Action", "Sci-Fi"]);
        assert_eq!(matrix.vote_average, 8.2);

        let toy_story = &movies[1];
        assert_eq!(toy_story.year, Some(1995));
        assert_eq!(toy_story.release_date, None);
        assert_eq!(toy_story.poster_path, None);
        assert!(toy_story.genres.is_empty());
    }

    #[test]
    fn test_parse_movies_errors() {
        let result = parse_movies_str("1::Too Few::Fields");
        assert!(matches!(
            result,
            Err(DataLoadError::FieldCountMismatch { expected: 7, found: 3, line: 1 })
        ));

        let result = parse_movies_str("1::Bad Vote::::::11.5::1.0::Drama");
        assert!(matches!(result, Err(DataLoadError::InvalidValue { .. })));

        let result = parse_movies_str("1::Bad Popularity::::::5.0::lots::Drama");
        assert!(matches!(result, Err(DataLoadError::ParseError { line: 1, .. })));
    }

    #[test]
    fn test_parse_ratings() {
        let content = "\
1::603::9::978300760
1::1::2::978300761::fell asleep:: twice
";
        let ratings = parse_ratings_str(content).unwrap();
        assert_eq!(ratings.len(), 2);
        assert_eq!(ratings[0].rating, 9);
        assert_eq!(ratings[0].notes, None);
        assert_eq!(ratings[1].notes.as_deref(), Some("fell asleep:: twice"));
        assert_eq!(ratings[1].watched_at, 978300761);
    }

    #[test]
    fn test_parse_ratings_errors() {
        assert!(matches!(
            parse_ratings_str("1::603"),
            Err(DataLoadError::ParseError { line: 1, .. })
        ));
        // Ratings are integers
        assert!(parse_ratings_str("1::603::4.5::978300760").is_err());
    }

    #[test]
    fn test_missing_similarity_file_is_empty() {
        let matrix = parse_similarity(Path::new("/definitely/not/here/similarity.json")).unwrap();
        assert!(matrix.is_empty());
    }

    #[test]
    fn test_missing_dat_file_reports_path() {
        let result = parse_movies(Path::new("/definitely/not/here/movies.dat"));
        assert!(matches!(result, Err(DataLoadError::FileNotFound { .. })));
    }
}
