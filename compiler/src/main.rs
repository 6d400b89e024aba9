//! hanlex 辞書コンパイラのメインエントリーポイント
//!
//! このモジュールは、カスタム辞書のキャッシュを作成・確認するためのサブコマンドを提供します。

mod build;
mod inspect;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::{build::BuildError, inspect::InspectError};

/// コマンドライン引数の構造体
///
/// `clap`を使用してコマンドライン引数をパースします。
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// 辞書ソースからキャッシュファイルを構築します
    ///
    /// 全ソースを統合してオートマトンを構築し、バイナリキャッシュとして書き出します。
    Build(build::Args),

    /// キャッシュファイルを検証し、その統計情報を表示します
    Inspect(inspect::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
#[derive(Debug, Error)]
pub enum CompileError {
    /// キャッシュ構築中のエラー
    #[error(transparent)]
    BuildError(#[from] BuildError),
    /// キャッシュ検証中のエラー
    #[error(transparent)]
    InspectError(#[from] InspectError),
}

/// メイン関数
///
/// ログ出力を初期化し、コマンドライン引数をパースして指定されたサブコマンドを実行します。
///
/// # エラー
///
/// 各サブコマンドの実行中にエラーが発生した場合、そのエラーが返されます。
fn main() -> Result<(), CompileError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Inspect(args) => Ok(inspect::run(args)?),
    }
}
