pub mod search;
pub mod status;
pub mod trending;

pub use search::{
    ImageDescriptor, ImdbOverview, ImdbSearchResponse, ImdbTitleEntity, ImdbTitleResponse,
    QuerySpec, SearchCandidate, TitleDetails,
};
pub use status::{SaveStatusRequest, StatusKind, StatusRecord, StatusResponse, WatchStatus};
pub use trending::{MediaType, TmdbMovieTrending, TmdbTrendingResponse, TmdbTvTrending, TrendingEntry};
