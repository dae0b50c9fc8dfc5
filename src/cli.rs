//! 命令行参数

use clap::Parser;
use std::path::PathBuf;

/// 按章节把小说翻译成越南语
#[derive(Parser, Debug)]
#[command(name = "novel-translate", version, long_about = None)]
pub struct Cli {
    /// 待翻译的文本文件（UTF-8）
    pub document: PathBuf,

    /// 所有确认提示都自动回答"是"
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_and_yes_flag() {
        let cli = Cli::try_parse_from(["novel-translate", "truyen.txt", "-y"]).unwrap();
        assert_eq!(cli.document, PathBuf::from("truyen.txt"));
        assert!(cli.yes);

        let cli = Cli::try_parse_from(["novel-translate", "--yes", "truyen.txt"]).unwrap();
        assert!(cli.yes);

        let cli = Cli::try_parse_from(["novel-translate", "truyen.txt"]).unwrap();
        assert!(!cli.yes);
    }

    #[test]
    fn test_help_is_not_taken_as_document() {
        let err = Cli::try_parse_from(["novel-translate", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_missing_or_extra_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["novel-translate"]).is_err());
        assert!(Cli::try_parse_from(["novel-translate", "a.txt", "b.txt"]).is_err());
    }
}
