mod common;

use axum::http::{Method, StatusCode};
use common::{Call, Recorder, router, send};
use feedgate_stream::ReactionFilter;
use serde_json::json;

#[tokio::test]
async fn add_post_creates_on_the_user_feed() {
    let rec = Recorder::default();
    let (status, body) = send(
        router(&rec),
        Method::POST,
        "/api/v1/post?userSerial=u1&postContent=hi",
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], 201);
    assert_eq!(body["message"], "Created");
    assert_eq!(body["detail"], "Feed has been successfully added to timeline!");
    assert_eq!(body["data"]["id"], "act-1");
    assert_eq!(body["data"]["post"], "hi");

    let calls = rec.calls();
    assert_eq!(calls.len(), 1);
    let Call::AddActivity { feed, activity } = &calls[0] else {
        panic!("unexpected call {:?}", calls[0]);
    };
    assert_eq!(feed, "user:u1");
    assert_eq!(activity.actor, "user:u1");
    assert_eq!(activity.verb, "post");
    assert_eq!(activity.object, "1");
    assert_eq!(activity.extra["post"], "hi");
}

#[tokio::test]
async fn add_post_accepts_encoded_content() {
    let rec = Recorder::default();
    let (status, body) = send(
        router(&rec),
        Method::POST,
        "/api/v1/post?userSerial=u1&postContent=hello%20world%21",
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["post"], "hello world!");
}

#[tokio::test]
async fn missing_required_params_never_reach_the_provider() {
    let cases = [
        (Method::POST, "/api/v1/post?userSerial=u1", "postContent is mandatory"),
        (Method::POST, "/api/v1/post?postContent=hi", "userSerial is mandatory"),
        (
            Method::POST,
            "/api/v1/post",
            "userSerial and postContent are mandatory",
        ),
        (
            Method::POST,
            "/api/v1/post?userSerial=&postContent=",
            "userSerial and postContent are mandatory",
        ),
        (Method::DELETE, "/api/v1/post?userSerial=u1", "postID is mandatory"),
        (Method::DELETE, "/api/v1/post?postID=p1", "userSerial is mandatory"),
        (
            Method::POST,
            "/api/v1/user/follow?ownUserSerial=a",
            "targetUserSerial is mandatory",
        ),
        (
            Method::POST,
            "/api/v1/user/unfollow?targetUserSerial=b",
            "ownUserSerial is mandatory",
        ),
        (Method::POST, "/api/v1/like?postID=p1", "likerUserSerial is mandatory"),
        (
            Method::POST,
            "/api/v1/like",
            "likerUserSerial and postID are mandatory",
        ),
    ];

    for (method, uri, detail) in cases {
        let rec = Recorder::default();
        let (status, body) = send(router(&rec), method.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(body["status"], 400);
        assert_eq!(body["message"], "Bad Request");
        assert_eq!(body["detail"], detail, "{method} {uri}");
        assert_eq!(body["data"], json!(null));
        assert!(rec.calls().is_empty(), "{method} {uri} reached the provider");
    }
}

#[tokio::test]
async fn blank_path_params_never_reach_the_provider() {
    let cases = [
        (Method::GET, "/api/v1/post/%20/summary", "userSerial is mandatory"),
        (Method::GET, "/api/v1/post/%20/detail", "userSerial is mandatory"),
        (Method::GET, "/api/v1/timeline/%20/summary", "userSerial is mandatory"),
        (Method::GET, "/api/v1/timeline/%20/detail", "userSerial is mandatory"),
        (Method::GET, "/api/v1/user/%20/followers", "userSerial is mandatory"),
        (Method::GET, "/api/v1/user/%20/following", "userSerial is mandatory"),
        (Method::GET, "/api/v1/like/%20", "postID is mandatory"),
        (Method::GET, "/api/v1/like/%20/r100", "postID is mandatory"),
        (Method::DELETE, "/api/v1/like/%20", "reactionID is mandatory"),
    ];

    for (method, uri, detail) in cases {
        let rec = Recorder::default();
        let (status, body) = send(router(&rec), method.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(body["detail"], detail, "{method} {uri}");
        assert_eq!(body["data"], json!(null));
        assert!(rec.calls().is_empty(), "{method} {uri} reached the provider");
    }
}

#[tokio::test]
async fn whitespace_only_content_counts_as_missing() {
    let rec = Recorder::default();
    let (status, body) = send(
        router(&rec),
        Method::POST,
        "/api/v1/post?userSerial=u1&postContent=%20%20",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "postContent is mandatory");
    assert!(rec.calls().is_empty());
}

#[tokio::test]
async fn repeated_query_keys_keep_the_first_value() {
    let rec = Recorder::default();
    let (status, body) = send(
        router(&rec),
        Method::POST,
        "/api/v1/post?userSerial=u1&userSerial=u2&postContent=hi",
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], 201);

    let calls = rec.calls();
    let [Call::AddActivity { feed, .. }] = calls.as_slice() else {
        panic!("unexpected calls {calls:?}");
    };
    assert_eq!(feed, "user:u1");
}

#[tokio::test]
async fn wrong_method_gets_a_405_envelope() {
    let rec = Recorder::default();
    let (status, body) = send(router(&rec), Method::PUT, "/api/v1/post?userSerial=u1").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], 405);
    assert_eq!(body["message"], "Method Not Allowed");
    assert_eq!(body["data"], json!(null));
    assert!(rec.calls().is_empty());
}

#[tokio::test]
async fn post_reads_use_the_user_feed() {
    let rec = Recorder::default();
    let (status, body) = send(router(&rec), Method::GET, "/api/v1/post/u1/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "success");
    assert_eq!(body["data"][0]["id"], "a2");
    assert_eq!(body["data"][1]["id"], "a1");

    let (status, body) = send(router(&rec), Method::GET, "/api/v1/post/u1/detail").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["reaction_counts"]["like"], 2);

    assert_eq!(
        rec.calls(),
        vec![
            Call::GetActivities {
                feed: "user:u1".into()
            },
            Call::GetEnriched {
                feed: "user:u1".into(),
                query: vec![
                    ("withReactionCounts", "true".into()),
                    ("reactionKindsFilter", "like".into()),
                ],
            },
        ]
    );
}

#[tokio::test]
async fn timeline_reads_use_the_timeline_feed() {
    let rec = Recorder::default();
    let (status, body) = send(router(&rec), Method::GET, "/api/v1/timeline/u1/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Success");

    let (status, _) = send(router(&rec), Method::GET, "/api/v1/timeline/u1/detail").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        rec.calls(),
        vec![
            Call::GetActivities {
                feed: "timeline:u1".into()
            },
            Call::GetEnriched {
                feed: "timeline:u1".into(),
                query: vec![
                    ("withRecentReactions", "true".into()),
                    ("withReactionCounts", "true".into()),
                ],
            },
        ]
    );
}

#[tokio::test]
async fn delete_post_removes_from_the_user_feed() {
    let rec = Recorder::default();
    let (status, body) = send(
        router(&rec),
        Method::DELETE,
        "/api/v1/post?userSerial=u1&postID=p1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Post with ID p1 has been successfully deleted!");
    assert_eq!(body["data"], json!(null));
    assert_eq!(
        rec.calls(),
        vec![Call::RemoveActivity {
            feed: "user:u1".into(),
            activity_id: "p1".into()
        }]
    );
}

#[tokio::test]
async fn follow_links_timeline_to_user_feed() {
    let rec = Recorder::default();
    let (status, body) = send(
        router(&rec),
        Method::POST,
        "/api/v1/user/follow?ownUserSerial=a&targetUserSerial=b",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "a has successfully followed b!");

    let (status, body) = send(
        router(&rec),
        Method::POST,
        "/api/v1/user/unfollow?ownUserSerial=a&targetUserSerial=b",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "a has successfully unfollowed b!");

    assert_eq!(
        rec.calls(),
        vec![
            Call::Follow {
                source: "timeline:a".into(),
                target: "user:b".into()
            },
            Call::Unfollow {
                source: "timeline:a".into(),
                target: "user:b".into()
            },
        ]
    );
}

#[tokio::test]
async fn follower_lists_read_both_directions() {
    let rec = Recorder::default();
    let (status, body) = send(router(&rec), Method::GET, "/api/v1/user/b/followers").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["feed_id"], "timeline:fan");

    let (status, body) = send(router(&rec), Method::GET, "/api/v1/user/a/following").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["target_id"], "user:idol");

    assert_eq!(
        rec.calls(),
        vec![
            Call::Followers {
                feed: "user:b".into()
            },
            Call::Followings {
                feed: "timeline:a".into()
            },
        ]
    );
}

#[tokio::test]
async fn like_adds_a_like_reaction() {
    let rec = Recorder::default();
    let (status, body) = send(
        router(&rec),
        Method::POST,
        "/api/v1/like?likerUserSerial=u2&postID=p1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "p1 has been successfully liked by u2!");
    assert_eq!(body["data"]["id"], "r1");
    assert_eq!(body["data"]["kind"], "like");

    let Call::AddReaction(req) = &rec.calls()[0] else {
        panic!("expected a reaction");
    };
    assert_eq!(
        (req.kind.as_str(), req.activity_id.as_str(), req.user_id.as_str()),
        ("like", "p1", "u2")
    );
}

#[tokio::test]
async fn likes_page_size_is_best_effort() {
    let cases = [
        ("/api/v1/like/p1", 10),
        ("/api/v1/like/p1?pageSize=25", 25),
        ("/api/v1/like/p1?pageSize=abc", 10),
        ("/api/v1/like/p1?pageSize=-5", 10),
        ("/api/v1/like/p1?pageSize=0", 10),
        ("/api/v1/like/p1?pageSize=", 10),
    ];
    for (uri, limit) in cases {
        let rec = Recorder::default();
        let (status, body) = send(router(&rec), Method::GET, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["data"]["results"][0]["id"], "r9");
        assert_eq!(
            rec.calls(),
            vec![Call::FilterReactions(
                ReactionFilter::by_activity("p1", "like").limit(limit)
            )],
            "{uri}"
        );
    }
}

#[tokio::test]
async fn likes_continue_before_the_cursor() {
    let rec = Recorder::default();
    let (status, body) = send(
        router(&rec),
        Method::GET,
        "/api/v1/like/p1/r100?pageSize=5",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Success");
    assert_eq!(
        rec.calls(),
        vec![Call::FilterReactions(
            ReactionFilter::by_activity("p1", "like")
                .limit(5)
                .id_lt(Some("r100".into()))
        )]
    );
}

#[tokio::test]
async fn delete_like_removes_the_reaction() {
    let rec = Recorder::default();
    let (status, body) = send(router(&rec), Method::DELETE, "/api/v1/like/r1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "reactionID r1 has been successfully removed!");
    assert_eq!(
        rec.calls(),
        vec![Call::RemoveReaction {
            reaction_id: "r1".into()
        }]
    );
}

#[tokio::test]
async fn provider_failures_become_500_with_the_message() {
    let endpoints = [
        (Method::POST, "/api/v1/post?userSerial=u1&postContent=hi"),
        (Method::GET, "/api/v1/post/u1/summary"),
        (Method::GET, "/api/v1/post/u1/detail"),
        (Method::DELETE, "/api/v1/post?userSerial=u1&postID=p1"),
        (Method::GET, "/api/v1/timeline/u1/summary"),
        (Method::GET, "/api/v1/timeline/u1/detail"),
        (Method::POST, "/api/v1/user/follow?ownUserSerial=a&targetUserSerial=b"),
        (Method::POST, "/api/v1/user/unfollow?ownUserSerial=a&targetUserSerial=b"),
        (Method::GET, "/api/v1/user/u1/followers"),
        (Method::GET, "/api/v1/user/u1/following"),
        (Method::POST, "/api/v1/like?likerUserSerial=u2&postID=p1"),
        (Method::GET, "/api/v1/like/p1"),
        (Method::GET, "/api/v1/like/p1/r100"),
        (Method::DELETE, "/api/v1/like/r1"),
    ];

    for (method, uri) in endpoints {
        let rec = Recorder::failing("upstream unavailable");
        let (status, body) = send(router(&rec), method.clone(), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(
            body,
            json!({
                "status": 500,
                "message": "Internal Server Error",
                "detail": "upstream unavailable",
                "data": null
            }),
            "{method} {uri}"
        );
        assert_eq!(rec.calls().len(), 1, "{method} {uri}");
    }
}

#[tokio::test]
async fn invalid_feed_ids_fail_before_the_provider() {
    let rec = Recorder::default();
    let (status, body) = send(router(&rec), Method::GET, "/api/v1/post/bad%20id/summary").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("invalid feed id user:bad id")
    );
    assert!(rec.calls().is_empty());
}

#[tokio::test]
async fn unknown_routes_get_a_404_envelope() {
    let rec = Recorder::default();
    let (status, body) = send(router(&rec), Method::GET, "/api/v2/post").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["data"], json!(null));
}
