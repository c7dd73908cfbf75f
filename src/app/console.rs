//! 控制台前端
//!
//! 表单、列表和对话框都在终端里完成：stdout 输出表格与提示，stdin 读取输入。

use std::io;
use tokio::io::{
    stdin, stdout, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin,
    Stdout,
};
use tracing::warn;

use super::product::client::ProductApi;
use super::product::dialog::{Interaction, Notification, NotificationLevel};
use super::product::form::ProductForm;
use super::product::model::Product;
use super::product::render::{format_price, render_table};
use super::product::service::ProductService;
use crate::infrastructure::storage::SlotStorage;

const MENU: &str =
    "Comandos: c = crear, e N = editar, d N = eliminar, r = refrescar, l = listar, q = salir";

pub struct Console<R, W> {
    reader: R,
    out: W,
}

/// 基于进程标准输入输出的控制台
pub fn stdio_console() -> Console<BufReader<Stdin>, Stdout> {
    Console::new(BufReader::new(stdin()), stdout())
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, out: W) -> Self {
        Self { reader, out }
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    pub async fn print(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes()).await?;
        self.out.flush().await
    }

    pub async fn println(&mut self, text: &str) -> io::Result<()> {
        self.print(&format!("{}\n", text)).await
    }

    /// 输出提示并读取一行；输入结束时返回 `None`，不是 UTF-8 的行会提示后重新读取
    pub async fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        loop {
            self.print(label).await?;
            let mut buf = Vec::new();
            if self.reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(None);
            }
            match String::from_utf8(buf) {
                Ok(line) => return Ok(Some(line.trim().to_string())),
                Err(e) => {
                    warn!(error = %e, "输入不是有效的 UTF-8");
                    self.println("Entrada no válida (se esperaba UTF-8)").await?;
                }
            }
        }
    }

    /// 带当前值的字段输入，直接回车保留当前值
    async fn prompt_field(&mut self, label: &str, current: &str) -> io::Result<Option<String>> {
        let shown = if current.is_empty() {
            format!("{}: ", label)
        } else {
            format!("{} [{}]: ", label, current)
        };
        Ok(self.prompt(&shown).await?.map(|value| {
            if value.is_empty() {
                current.to_string()
            } else {
                value
            }
        }))
    }

    /// 依次填写四个字段；中途输入结束返回 `false`
    async fn fill_form(&mut self, form: &mut ProductForm) -> io::Result<bool> {
        let Some(name) = self.prompt_field("Nombre", form.name()).await? else {
            return Ok(false);
        };
        form.set_name(name);
        let Some(features) = self.prompt_field("Características", form.features()).await? else {
            return Ok(false);
        };
        form.set_features(features);
        let Some(price) = self.prompt_field("Precio", form.price()).await? else {
            return Ok(false);
        };
        form.set_price(price);
        let Some(year) = self.prompt_field("Año", form.year()).await? else {
            return Ok(false);
        };
        form.set_year(year);
        Ok(true)
    }

    async fn ask_yes_no(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.prompt(&format!("{} (s/n): ", question)).await?;
        Ok(matches!(
            answer.as_deref().map(str::to_lowercase).as_deref(),
            Some("s" | "si" | "sí" | "y" | "yes")
        ))
    }
}

fn log_io(result: io::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "控制台输出失败");
    }
}

impl<R, W> Interaction for Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn edit_product(&mut self, mut form: ProductForm) -> Option<ProductForm> {
        let result = async {
            self.println("--- Editar producto ---").await?;
            if !self.fill_form(&mut form).await? {
                return Ok(false);
            }
            self.ask_yes_no("¿Guardar?").await
        }
        .await;

        match result {
            Ok(true) => Some(form),
            Ok(false) => None,
            Err(e) => {
                warn!(error = %e, "读取编辑输入失败");
                None
            }
        }
    }

    async fn confirm_delete(&mut self, id: &str, product: Option<&Product>) -> bool {
        let question = match product {
            Some(p) => format!(
                "--- Eliminar producto ---\n{} ({}, {})\n¿Estas seguro de que deseas eliminar este producto?",
                p.name,
                p.data.features,
                format_price(p.data.price)
            ),
            None => format!(
                "--- Eliminar producto ---\nid {}\n¿Estas seguro de que deseas eliminar este producto?",
                id
            ),
        };
        match self.ask_yes_no(&question).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "读取确认输入失败");
                false
            }
        }
    }

    async fn notify(&mut self, notification: Notification) {
        let mark = match notification.level {
            NotificationLevel::Success => "✔",
            NotificationLevel::Error => "✖",
        };
        let line = format!("[{}] {}: {}", mark, notification.title, notification.text);
        log_io(self.println(&line).await);
    }
}

/// 菜单命令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Create,
    Edit(usize),
    Delete(usize),
    Refresh,
    List,
    Quit,
}

impl Command {
    /// 解析一行输入；行号从 1 开始
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let cmd = parts.next()?.to_lowercase();
        let row = parts.next().and_then(|n| n.parse::<usize>().ok());
        if parts.next().is_some() {
            return None;
        }

        match (cmd.as_str(), row) {
            ("c" | "crear", None) => Some(Command::Create),
            ("e" | "editar", Some(n)) if n > 0 => Some(Command::Edit(n)),
            ("d" | "eliminar", Some(n)) if n > 0 => Some(Command::Delete(n)),
            ("r" | "refrescar", None) => Some(Command::Refresh),
            ("l" | "listar", None) => Some(Command::List),
            ("q" | "salir", None) => Some(Command::Quit),
            _ => None,
        }
    }
}

/// 主循环：每条命令执行完毕后才读取下一条，操作之间不会并发
pub async fn run<A, S, R, W>(
    service: &mut ProductService<A, S>,
    console: &mut Console<R, W>,
) -> io::Result<()>
where
    A: ProductApi,
    S: SlotStorage,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut form = ProductForm::new();

    console.println("=== CRUD API REST ===").await?;
    console.print(&render_table(service.products())).await?;

    loop {
        console.println(MENU).await?;
        let Some(line) = console.prompt("> ").await? else {
            break;
        };
        if line.is_empty() {
            continue;
        }

        let Some(command) = Command::parse(&line) else {
            console.println("Comando no reconocido").await?;
            continue;
        };

        // 操作失败已经通过通知展示给用户，这里不再处理错误
        match command {
            Command::Quit => break,
            Command::List => {}
            Command::Create => {
                console.println("--- Crear un nuevo producto ---").await?;
                if !console.fill_form(&mut form).await? {
                    break;
                }
                let _ = service.create(&mut form, console).await;
            }
            Command::Edit(row) | Command::Delete(row) => {
                let id = match service.products().get(row - 1) {
                    Some(product) if product.is_persisted() => product.id.clone(),
                    Some(_) => {
                        console.println("El producto no tiene id").await?;
                        continue;
                    }
                    None => {
                        console.println(&format!("No existe la fila {}", row)).await?;
                        continue;
                    }
                };
                let Some(id) = id else { continue };
                if matches!(command, Command::Edit(_)) {
                    let _ = service.edit(&id, console).await;
                } else {
                    let _ = service.delete(&id, console).await;
                }
            }
            Command::Refresh => {
                let _ = service.refresh(console).await;
            }
        }

        console.print(&render_table(service.products())).await?;
    }

    console.println("Hasta luego").await
}
