use bytes::Bytes;
use uuid::Uuid;

use tavola_domain::visibility::Visibility;

use tavola_server::domain::types::IngredientInput;
use tavola_server::error::ApiError;
use tavola_server::usecase::account::{
    LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, UpdateAccountInput,
    UpdateAccountUseCase,
};
use tavola_server::usecase::image::UploadRecipeImageUseCase;
use tavola_server::usecase::recipe::{CreateRecipeInput, CreateRecipeUseCase};

use crate::helpers::{
    MockCredentialRepo, MockRecipeRepo, MockSearchIndex, MockStore, MockTranscoder, MockUserRepo,
};

fn register_input(username: &str, email: &str) -> RegisterInput {
    RegisterInput {
        username: username.to_owned(),
        email: email.to_owned(),
        display_name: None,
        password: "long-enough-pw".to_owned(),
    }
}

#[tokio::test]
async fn should_register_then_login_with_the_same_password() {
    let users = MockUserRepo::empty();
    RegisterUseCase {
        users: users.clone(),
    }
    .execute(register_input("alice", "alice@example.com"))
    .await
    .unwrap();

    // The credential row exists alongside the user row.
    assert!(users.credentials.lock().unwrap().contains_key("alice"));

    let user = LoginUseCase {
        users: users.clone(),
        credentials: MockCredentialRepo {
            credentials: users.credentials.clone(),
        },
    }
    .execute(LoginInput {
        username: "alice".to_owned(),
        password: "long-enough-pw".to_owned(),
    })
    .await
    .unwrap();
    assert_eq!(user.email, "alice@example.com");
}

#[tokio::test]
async fn should_reject_login_with_wrong_password() {
    let users = MockUserRepo::empty();
    RegisterUseCase {
        users: users.clone(),
    }
    .execute(register_input("alice", "alice@example.com"))
    .await
    .unwrap();

    let result = LoginUseCase {
        users: users.clone(),
        credentials: MockCredentialRepo {
            credentials: users.credentials.clone(),
        },
    }
    .execute(LoginInput {
        username: "alice".to_owned(),
        password: "wrong-password".to_owned(),
    })
    .await;
    assert!(
        matches!(result, Err(ApiError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_login_for_unknown_user() {
    let users = MockUserRepo::empty();
    let result = LoginUseCase {
        users: users.clone(),
        credentials: MockCredentialRepo {
            credentials: users.credentials.clone(),
        },
    }
    .execute(LoginInput {
        username: "ghost".to_owned(),
        password: "whatever-pw".to_owned(),
    })
    .await;
    // Same error as a bad password, so the response does not reveal which
    // part was wrong.
    assert!(matches!(result, Err(ApiError::InvalidCredentials)));
}

#[tokio::test]
async fn should_conflict_on_duplicate_email() {
    let users = MockUserRepo::empty();
    let uc = RegisterUseCase {
        users: users.clone(),
    };
    uc.execute(register_input("alice", "alice@example.com"))
        .await
        .unwrap();

    let result = uc
        .execute(register_input("alice2", "alice@example.com"))
        .await;
    assert!(matches!(result, Err(ApiError::Conflict)));
}

#[tokio::test]
async fn should_update_profile_email() {
    let users = MockUserRepo::empty();
    let user = RegisterUseCase {
        users: users.clone(),
    }
    .execute(register_input("alice", "alice@example.com"))
    .await
    .unwrap();

    UpdateAccountUseCase {
        users: users.clone(),
    }
    .execute(
        user.id,
        UpdateAccountInput {
            display_name: Some("Alice B.".to_owned()),
            email: Some("alice.b@example.com".to_owned()),
        },
    )
    .await
    .unwrap();

    let stored = users.users.lock().unwrap()[0].clone();
    assert_eq!(stored.display_name, "Alice B.");
    assert_eq!(stored.email, "alice.b@example.com");
}

#[tokio::test]
async fn should_reject_taking_another_users_email() {
    let users = MockUserRepo::empty();
    let uc = RegisterUseCase {
        users: users.clone(),
    };
    uc.execute(register_input("alice", "alice@example.com"))
        .await
        .unwrap();
    let bob = uc
        .execute(register_input("bob", "bob@example.com"))
        .await
        .unwrap();

    let result = UpdateAccountUseCase {
        users: users.clone(),
    }
    .execute(
        bob.id,
        UpdateAccountInput {
            display_name: None,
            email: Some("alice@example.com".to_owned()),
        },
    )
    .await;
    assert!(matches!(result, Err(ApiError::Conflict)));
}

// ── Image upload pipeline ────────────────────────────────────────────────────

#[tokio::test]
async fn should_transcode_store_and_persist_recipe_image() {
    let recipes = MockRecipeRepo::empty();
    let author = Uuid::new_v4();
    let recipe = CreateRecipeUseCase {
        recipes: recipes.clone(),
        search: MockSearchIndex::empty(),
    }
    .execute(
        author,
        CreateRecipeInput {
            title: "Focaccia".to_owned(),
            description: String::new(),
            prep_minutes: 45,
            visibility: Visibility::Public,
            ingredients: vec![IngredientInput {
                name: "flour".to_owned(),
                quantity: "500 g".to_owned(),
            }],
            steps: vec!["bake".to_owned()],
        },
    )
    .await
    .unwrap();

    let storage = MockStore::empty();
    let url = UploadRecipeImageUseCase {
        recipes: recipes.clone(),
        transcoder: MockTranscoder,
        storage: storage.clone(),
    }
    .execute(author, recipe.id, Bytes::from_static(b"raw image bytes"))
    .await
    .unwrap();

    assert!(url.starts_with("https://cdn.test/recipes/"));
    assert_eq!(storage.objects.lock().unwrap().len(), 1);
    let stored = recipes.recipes.lock().unwrap()[0].clone();
    assert_eq!(stored.image_url.as_deref(), Some(url.as_str()));
    assert!(stored.image_key.is_some());
}

#[tokio::test]
async fn should_forbid_image_upload_by_non_author() {
    let recipes = MockRecipeRepo::empty();
    let author = Uuid::new_v4();
    let recipe = CreateRecipeUseCase {
        recipes: recipes.clone(),
        search: MockSearchIndex::empty(),
    }
    .execute(
        author,
        CreateRecipeInput {
            title: "Focaccia".to_owned(),
            description: String::new(),
            prep_minutes: 45,
            visibility: Visibility::Public,
            ingredients: vec![],
            steps: vec![],
        },
    )
    .await
    .unwrap();

    let result = UploadRecipeImageUseCase {
        recipes,
        transcoder: MockTranscoder,
        storage: MockStore::empty(),
    }
    .execute(
        Uuid::new_v4(),
        recipe.id,
        Bytes::from_static(b"raw image bytes"),
    )
    .await;
    assert!(matches!(result, Err(ApiError::Forbidden)));
}
