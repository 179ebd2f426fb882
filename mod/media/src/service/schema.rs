use vidtube_store::CollectionSpec;

/// Collections registered with the Entity Store.
///
/// Indexed fields back the equality predicates the views and toggles
/// issue; the unique tuples on likes/subscriptions are what turn the
/// toggle engine's check-then-act race into a safe conflict. Users get
/// unique handles and addresses the same way.
pub const COLLECTIONS: &[CollectionSpec] = &[
    CollectionSpec {
        name: "users",
        indexed: &["username", "email"],
        unique: &[&["username"], &["email"]],
    },
    CollectionSpec {
        name: "videos",
        indexed: &["owner", "isPublished"],
        unique: &[],
    },
    CollectionSpec {
        name: "tweets",
        indexed: &["owner"],
        unique: &[],
    },
    CollectionSpec {
        name: "comments",
        indexed: &["owner", "video"],
        unique: &[],
    },
    CollectionSpec {
        name: "likes",
        indexed: &["likedBy", "targetId", "targetKind"],
        unique: &[&["likedBy", "targetId", "targetKind"]],
    },
    CollectionSpec {
        name: "subscriptions",
        indexed: &["subscriber", "channel"],
        unique: &[&["subscriber", "channel"]],
    },
    CollectionSpec {
        name: "playlists",
        indexed: &["owner"],
        unique: &[],
    },
];
