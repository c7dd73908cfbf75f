use crud_productos::app::console::{run, Console};
use crud_productos::app::product::{
    HttpProductApi, MirrorStore, Outcome, Product, ProductApi, ProductForm, ProductPayload,
    ProductService, ScriptedInteraction,
};
use crud_productos::infrastructure::config::ApiConfig;
use crud_productos::infrastructure::storage::{FileSlotStorage, SlotStorage};
use crud_productos::sandbox::{serve, SandboxState};
use crud_productos::CoreError;
use tempfile::{tempdir, TempDir};
use tokio::net::TcpListener;

/// 在随机端口启动沙箱，返回客户端和沙箱状态
async fn start_sandbox() -> (HttpProductApi, SandboxState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = SandboxState::new();
    tokio::spawn(serve(listener, state.clone()));

    let api = HttpProductApi::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_seconds: Some(5),
    })
    .unwrap();
    (api, state)
}

async fn service_in(
    dir: &TempDir,
) -> (ProductService<HttpProductApi, FileSlotStorage>, SandboxState) {
    let (api, state) = start_sandbox().await;
    let store = MirrorStore::open(FileSlotStorage::new(dir.path()), "products").unwrap();
    (ProductService::new(api, store), state)
}

fn teclado_form() -> ProductForm {
    let mut form = ProductForm::new();
    form.set_name("Teclado");
    form.set_features("Mecánico");
    form.set_price("1000");
    form.set_year("2025");
    form
}

fn persisted(dir: &TempDir) -> Vec<Product> {
    FileSlotStorage::new(dir.path())
        .load("products")
        .unwrap()
        .unwrap_or_default()
}

#[tokio::test]
async fn test_create_edit_delete_scenario() {
    let dir = tempdir().unwrap();
    let (mut service, state) = service_in(&dir).await;

    // 创建
    let mut form = teclado_form();
    let mut ui = ScriptedInteraction::new();
    let created = match service.create(&mut form, &mut ui).await.unwrap() {
        Outcome::Created(product) => product,
        other => panic!("unexpected outcome: {:?}", other),
    };
    let id = created.id.clone().unwrap();

    assert_eq!(service.products().len(), 1);
    assert_eq!(service.products()[0].name, "Teclado");
    assert_eq!(service.products()[0].data.price, 1000.0);
    assert_eq!(persisted(&dir), service.products());
    assert!(form.is_empty());
    assert_eq!(state.len(), 1);

    // 编辑价格
    let mut edited = ProductForm::from_product(&created);
    edited.set_price("1200");
    let mut ui = ScriptedInteraction::new().submit_edit(edited);
    service.edit(&id, &mut ui).await.unwrap();

    assert_eq!(service.products().len(), 1);
    assert_eq!(service.products()[0].data.price, 1200.0);
    assert!(service.products()[0].has_id(&id));
    assert!(service.products()[0].updated_at.is_some());
    assert_eq!(persisted(&dir), service.products());

    // 确认删除
    let mut ui = ScriptedInteraction::new().confirm(true);
    service.delete(&id, &mut ui).await.unwrap();

    assert!(service.products().is_empty());
    assert!(persisted(&dir).is_empty());
    assert!(state.is_empty());
}

#[tokio::test]
async fn test_declined_delete_keeps_remote_and_local() {
    let dir = tempdir().unwrap();
    let (mut service, state) = service_in(&dir).await;
    service
        .create(&mut teclado_form(), &mut ScriptedInteraction::new())
        .await
        .unwrap();
    let id = service.store().ids().remove(0);

    let mut ui = ScriptedInteraction::new().confirm(false);
    let outcome = service.delete(&id, &mut ui).await.unwrap();

    assert_eq!(outcome, Outcome::Declined);
    assert_eq!(service.products().len(), 1);
    assert_eq!(state.len(), 1);
    assert!(ui.notifications.is_empty());
}

#[tokio::test]
async fn test_edit_of_remotely_deleted_product_leaves_store() {
    let dir = tempdir().unwrap();
    let (mut service, _state) = service_in(&dir).await;
    service
        .create(&mut teclado_form(), &mut ScriptedInteraction::new())
        .await
        .unwrap();
    let id = service.store().ids().remove(0);
    service.api().delete(&id).await.unwrap();
    let before = service.products().to_vec();

    let mut edited = teclado_form();
    edited.set_price("1");
    let mut ui = ScriptedInteraction::new().submit_edit(edited);
    let err = service.edit(&id, &mut ui).await.unwrap_err();

    assert!(matches!(err, CoreError::Status { status: 404, .. }));
    assert_eq!(service.products(), before.as_slice());
    assert_eq!(persisted(&dir), before);
    let note = ui.last_notification().unwrap();
    assert!(note.is_error());
    assert!(note.text.contains(&id));
}

#[tokio::test]
async fn test_delete_unknown_id_is_error_without_mutation() {
    let dir = tempdir().unwrap();
    let (mut service, _state) = service_in(&dir).await;
    service
        .create(&mut teclado_form(), &mut ScriptedInteraction::new())
        .await
        .unwrap();

    let mut ui = ScriptedInteraction::new().confirm(true);
    let err = service.delete("missing", &mut ui).await.unwrap_err();

    assert!(matches!(err, CoreError::Status { status: 404, .. }));
    assert_eq!(service.products().len(), 1);
    assert_eq!(
        ui.last_notification().unwrap().text,
        "Object with id=missing doesn't exist."
    );
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    // 先占用再释放端口，保证连接被拒绝
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempdir().unwrap();
    let api = HttpProductApi::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_seconds: Some(2),
    })
    .unwrap();
    let store = MirrorStore::open(FileSlotStorage::new(dir.path()), "products").unwrap();
    let mut service = ProductService::new(api, store);

    let mut form = teclado_form();
    let mut ui = ScriptedInteraction::new();
    let err = service.create(&mut form, &mut ui).await.unwrap_err();

    assert!(matches!(err, CoreError::Transport(_)));
    assert!(service.products().is_empty());
    assert_eq!(form, teclado_form());
    assert!(ui.last_notification().unwrap().is_error());
}

#[tokio::test]
async fn test_refresh_and_reopen() {
    let dir = tempdir().unwrap();
    let (mut service, _state) = service_in(&dir).await;
    let mut ui = ScriptedInteraction::new();
    service.create(&mut teclado_form(), &mut ui).await.unwrap();
    let id = service.store().ids().remove(0);

    // 绕过本地镜像直接修改远程
    service
        .api()
        .update(&id, &ProductPayload::new("Teclado", "Mecánico", 900.0, 2025))
        .await
        .unwrap();

    assert_eq!(service.refresh(&mut ui).await.unwrap(), Outcome::Refreshed(1));
    assert_eq!(service.products()[0].data.price, 900.0);

    let reopened = MirrorStore::open(FileSlotStorage::new(dir.path()), "products").unwrap();
    assert_eq!(reopened.products(), service.products());
}

#[tokio::test]
async fn test_console_session() {
    let dir = tempdir().unwrap();
    let (mut service, state) = service_in(&dir).await;

    let script = "c\nTeclado\nMecánico\n1000\n2025\n\
                  e 1\n\n\n1200\n\ns\n\
                  d 1\nn\n\
                  d 1\ns\n\
                  q\n";
    let mut console = Console::new(script.as_bytes(), Vec::new());

    run(&mut service, &mut console).await.unwrap();

    let output = String::from_utf8(console.into_writer()).unwrap();
    assert!(output.contains("[✔] Producto creado"));
    assert!(output.contains("$1200"));
    assert!(output.contains("[✔] Producto eliminado"));
    assert!(output.trim_end().ends_with("Hasta luego"));
    assert!(service.products().is_empty());
    assert!(state.is_empty());
}

#[tokio::test]
async fn test_console_session_survives_invalid_utf8() {
    let dir = tempdir().unwrap();
    let (mut service, state) = service_in(&dir).await;

    // 非 UTF-8 的菜单输入和表单输入都只会被要求重新输入
    let script: &[u8] = b"\xff\xfe\nc\nTeclado\nMec\xe1nico\nMec\xc3\xa1nico\n1000\n2025\nq\n";
    let mut console = Console::new(script, Vec::new());

    run(&mut service, &mut console).await.unwrap();

    let output = String::from_utf8(console.into_writer()).unwrap();
    assert_eq!(output.matches("Entrada no válida").count(), 2);
    assert!(output.contains("[✔] Producto creado"));
    assert!(output.trim_end().ends_with("Hasta luego"));
    assert_eq!(service.products()[0].data.features, "Mecánico");
    assert_eq!(state.len(), 1);
}
