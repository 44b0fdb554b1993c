use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Minimal profile projection joined onto feed rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster_url: Option<String>,
    pub plot: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub imdb_rating: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Minimal movie projection joined onto feed rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    pub poster_url: Option<String>,
    pub year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    pub rating: i64,
    pub review_text: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewWithDetails {
    #[serde(flatten)]
    pub review: Review,
    pub user: ProfileSummary,
    pub movie: MovieSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewWithFullDetails {
    #[serde(flatten)]
    pub review: Review,
    pub user: Profile,
    pub movie: Movie,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewWithMovie {
    #[serde(flatten)]
    pub review: Review,
    pub movie: MovieSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub review_id: String,
    pub user_id: String,
    pub comment_text: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithUser {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: ProfileSummary,
}

/// Vote direction on a comment. Stored as +1 / -1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Up,
    Down,
}

impl Polarity {
    pub fn value(self) -> i64 {
        match self {
            Polarity::Up => 1,
            Polarity::Down => -1,
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Polarity::Up),
            -1 => Some(Polarity::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentVote {
    pub id: String,
    pub comment_id: String,
    pub user_id: String,
    pub vote_type: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    pub upvotes: i64,
    pub downvotes: i64,
}

/// The three fixed saved-movie list categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListCategory {
    Watchlist,
    Favorites,
    Watched,
}

impl ListCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ListCategory::Watchlist => "watchlist",
            ListCategory::Favorites => "favorites",
            ListCategory::Watched => "watched",
        }
    }
}

impl std::str::FromStr for ListCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watchlist" => Ok(ListCategory::Watchlist),
            "favorites" => Ok(ListCategory::Favorites),
            "watched" => Ok(ListCategory::Watched),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedMovie {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    pub list_type: ListCategory,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedMovieWithMovie {
    #[serde(flatten)]
    pub saved: SavedMovie,
    pub movie: Movie,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserFollow {
    pub id: String,
    pub follower_id: String,
    pub following_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomList {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomListWithCount {
    #[serde(flatten)]
    pub list: CustomList,
    pub movie_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomListWithOwner {
    #[serde(flatten)]
    pub list: CustomList,
    pub user: ProfileSummary,
    pub movie_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomListMovie {
    pub id: String,
    pub list_id: String,
    pub movie_id: String,
    pub added_at: String,
}

/// One membership row of a custom list, with the movie's full record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomListEntry {
    pub id: String,
    pub added_at: String,
    pub movie: Movie,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomListWithMovies {
    #[serde(flatten)]
    pub list: CustomList,
    pub movies: Vec<CustomListEntry>,
}
