use std::collections::HashSet;

use crate::domain::books::Book;
use crate::domain::ids::BookId;

/// Maximum number of books in a recommendation feed.
pub const FEED_LIMIT: usize = 10;

/// Content-based recommendation filter.
///
/// `engaged` is the set of books the user has rated or liked. The candidate
/// pool is every book sharing a genre (exact string match) with an engaged
/// book, minus the engaged books themselves, ranked by average rating and
/// then by recency. A user with no engagement gets an empty feed — there is
/// deliberately no fallback to globally popular books.
///
/// Books the user added but never engaged with stay in the pool.
pub fn recommend(books: Vec<Book>, engaged: &HashSet<BookId>) -> Vec<Book> {
    let engaged_genres: HashSet<String> = books
        .iter()
        .filter(|book| engaged.contains(&book.id))
        .filter_map(|book| book.genre.clone())
        .collect();

    if engaged_genres.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<Book> = books
        .into_iter()
        .filter(|book| !engaged.contains(&book.id))
        .filter(|book| {
            book.genre
                .as_deref()
                .is_some_and(|genre| engaged_genres.contains(genre))
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.average_rating
            .total_cmp(&a.average_rating)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    candidates.truncate(FEED_LIMIT);
    candidates
}
