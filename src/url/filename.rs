use crate::ScrapeError;
use url::Url;

/// Derives a destination filename from a resource URL
///
/// The filename is the last segment of the URL's path; the query and fragment
/// are ignored. A URL whose path ends in `/`, or that has no path segments at
/// all, yields [`ScrapeError::InvalidFilename`].
///
/// # Examples
///
/// ```
/// use image_scraper::url::file_name_from_url;
///
/// let name = file_name_from_url("https://example.com/a/b/photo.jpg?w=200").unwrap();
/// assert_eq!(name, "photo.jpg");
///
/// assert!(file_name_from_url("https://example.com/gallery/").is_err());
/// ```
pub fn file_name_from_url(raw: &str) -> Result<String, ScrapeError> {
    let invalid = || ScrapeError::InvalidFilename {
        url: raw.to_string(),
    };

    let url = Url::parse(raw).map_err(|_| invalid())?;
    let name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .ok_or_else(invalid)?;

    if name.is_empty() || name == "." || name == ".." {
        return Err(invalid());
    }

    Ok(name.to_string())
}
