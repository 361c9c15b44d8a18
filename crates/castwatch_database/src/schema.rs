//! Diesel table definitions for the embedded SQLite store (spec §3).

diesel::table! {
    /// One row per resolved remote video, or a not-found sentinel when
    /// `yt_video_id` is null.
    videos (id) {
        id -> BigInt,
        yt_video_id -> Nullable<Text>,
        ha_title -> Text,
        ha_artist -> Nullable<Text>,
        ha_app_name -> Nullable<Text>,
        ha_duration -> Nullable<Integer>,
        ha_content_hash -> Text,
        yt_title -> Nullable<Text>,
        yt_channel -> Nullable<Text>,
        yt_channel_id -> Nullable<Text>,
        yt_description -> Nullable<Text>,
        yt_published_at -> Nullable<Timestamp>,
        yt_category_id -> Nullable<Text>,
        yt_live_broadcast -> Nullable<Bool>,
        yt_location -> Nullable<Text>,
        yt_recording_date -> Nullable<Timestamp>,
        yt_duration -> Nullable<Integer>,
        yt_url -> Nullable<Text>,
        rating -> Text,
        rating_score -> Integer,
        play_count -> Integer,
        date_added -> Timestamp,
        date_last_played -> Nullable<Timestamp>,
        source -> Text,
        pending_reason -> Nullable<Text>,
        last_attempt -> Nullable<Timestamp>,
    }
}

diesel::table! {
    /// The unified FIFO-within-priority work queue.
    queue_items (id) {
        id -> BigInt,
        priority -> SmallInt,
        status -> Text,
        payload -> Text,
        requested_at -> Timestamp,
        last_attempt -> Nullable<Timestamp>,
        completed_at -> Nullable<Timestamp>,
        attempts -> Integer,
        last_error -> Nullable<Text>,
        api_response_data -> Nullable<Text>,
    }
}

diesel::table! {
    /// Opportunistically cached remote video details, TTL-evicted.
    search_result_cache (yt_video_id) {
        yt_video_id -> Text,
        yt_title -> Text,
        yt_channel -> Nullable<Text>,
        yt_channel_id -> Nullable<Text>,
        yt_duration -> Nullable<Integer>,
        yt_description -> Nullable<Text>,
        yt_category_id -> Nullable<Text>,
        expires_at -> Timestamp,
    }
}

diesel::table! {
    /// Per-day, per-hour API call counters.
    api_usage (day) {
        day -> Text,
        hour_00 -> Integer,
        hour_01 -> Integer,
        hour_02 -> Integer,
        hour_03 -> Integer,
        hour_04 -> Integer,
        hour_05 -> Integer,
        hour_06 -> Integer,
        hour_07 -> Integer,
        hour_08 -> Integer,
        hour_09 -> Integer,
        hour_10 -> Integer,
        hour_11 -> Integer,
        hour_12 -> Integer,
        hour_13 -> Integer,
        hour_14 -> Integer,
        hour_15 -> Integer,
        hour_16 -> Integer,
        hour_17 -> Integer,
        hour_18 -> Integer,
        hour_19 -> Integer,
        hour_20 -> Integer,
        hour_21 -> Integer,
        hour_22 -> Integer,
        hour_23 -> Integer,
    }
}

diesel::table! {
    /// Append-only record of every remote call, used by the Quota Calendar.
    api_call_log (id) {
        id -> BigInt,
        method -> Text,
        success -> Bool,
        quota_cost -> Integer,
        error_message -> Nullable<Text>,
        called_at -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    videos,
    queue_items,
    search_result_cache,
    api_usage,
    api_call_log,
);
