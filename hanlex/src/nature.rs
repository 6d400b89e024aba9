//! 品詞タグの定義
//!
//! このモジュールは、中国語の品詞体系(ICTCLAS / 北京大学方式)に基づく
//! 品詞タグの列挙型 [`Nature`] を提供します。各タグは安定した序数を持ち、
//! キャッシュファイルにはこの序数が書き込まれます。

use std::fmt;
use std::str::FromStr;

use crate::errors::HanlexError;

macro_rules! natures {
    ( $( $(#[$doc:meta])* $variant:ident => $tag:literal, )* ) => {
        /// 品詞タグ
        ///
        /// 宣言順がそのまま序数になります。キャッシュ形式の互換性を保つため、
        /// 既存のタグの順序は変更しないでください。新しいタグは末尾に追加します。
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum Nature {
            $( $(#[$doc])* $variant, )*
        }

        impl Nature {
            /// 全タグを序数順に並べた配列
            pub const ALL: &'static [Nature] = &[ $( Nature::$variant, )* ];

            /// タグ名を返します。
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( Nature::$variant => $tag, )*
                }
            }

            fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $( $tag => Some(Nature::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

natures! {
    /// 区別語素
    Bg => "bg",
    /// 数語素
    Mg => "mg",
    /// 名詞性慣用語
    Nl => "nl",
    /// 字母専名
    Nx => "nx",
    /// 量詞語素
    Qg => "qg",
    Ud => "ud",
    Uj => "uj",
    Uz => "uz",
    Ug => "ug",
    Ul => "ul",
    Uv => "uv",
    Yg => "yg",
    Zg => "zg",
    /// 名詞
    N => "n",
    /// 人名
    Nr => "nr",
    Nrj => "nrj",
    Nrf => "nrf",
    Nr1 => "nr1",
    Nr2 => "nr2",
    /// 地名
    Ns => "ns",
    Nsf => "nsf",
    /// 機関・団体名
    Nt => "nt",
    Ntc => "ntc",
    Ntcf => "ntcf",
    Ntcb => "ntcb",
    Ntch => "ntch",
    Nto => "nto",
    Ntu => "ntu",
    Nts => "nts",
    Nth => "nth",
    Nh => "nh",
    Nhm => "nhm",
    Nhd => "nhd",
    Nn => "nn",
    Nnt => "nnt",
    Nnd => "nnd",
    Ng => "ng",
    Nf => "nf",
    Ni => "ni",
    Nit => "nit",
    Nic => "nic",
    Nis => "nis",
    Nm => "nm",
    Nmc => "nmc",
    Nb => "nb",
    Nba => "nba",
    Nbc => "nbc",
    Nbp => "nbp",
    /// その他の固有名詞
    Nz => "nz",
    G => "g",
    Gm => "gm",
    Gp => "gp",
    Gc => "gc",
    Gb => "gb",
    Gbc => "gbc",
    Gg => "gg",
    Gi => "gi",
    /// 略語
    J => "j",
    /// 成語
    I => "i",
    /// 慣用語
    L => "l",
    /// 時間詞
    T => "t",
    Tg => "tg",
    /// 場所詞
    S => "s",
    /// 方位詞
    F => "f",
    /// 動詞
    V => "v",
    Vd => "vd",
    Vn => "vn",
    Vshi => "vshi",
    Vyou => "vyou",
    Vf => "vf",
    Vx => "vx",
    Vi => "vi",
    Vl => "vl",
    Vg => "vg",
    /// 形容詞
    A => "a",
    Ad => "ad",
    An => "an",
    Ag => "ag",
    Al => "al",
    /// 区別詞
    B => "b",
    Bl => "bl",
    /// 状態詞
    Z => "z",
    /// 代詞
    R => "r",
    Rr => "rr",
    Rz => "rz",
    Rzt => "rzt",
    Rzs => "rzs",
    Rzv => "rzv",
    Ry => "ry",
    Ryt => "ryt",
    Rys => "rys",
    Ryv => "ryv",
    Rg => "rg",
    /// 数詞
    M => "m",
    Mq => "mq",
    /// 量詞
    Q => "q",
    Qv => "qv",
    Qt => "qt",
    /// 副詞
    D => "d",
    Dg => "dg",
    Dl => "dl",
    /// 介詞
    P => "p",
    Pba => "pba",
    Pbei => "pbei",
    /// 連詞
    C => "c",
    Cc => "cc",
    /// 助詞
    U => "u",
    Uzhe => "uzhe",
    Ule => "ule",
    Uguo => "uguo",
    Ude1 => "ude1",
    Ude2 => "ude2",
    Ude3 => "ude3",
    Usuo => "usuo",
    Udeng => "udeng",
    Uyy => "uyy",
    Udh => "udh",
    Uls => "uls",
    Uzhi => "uzhi",
    Ulian => "ulian",
    /// 感嘆詞
    E => "e",
    /// 語気詞
    Y => "y",
    /// 擬声詞
    O => "o",
    /// 接頭辞
    H => "h",
    /// 接尾辞
    K => "k",
    /// 文字列
    X => "x",
    Xx => "xx",
    Xu => "xu",
    /// 句読点
    W => "w",
    Wkz => "wkz",
    Wky => "wky",
    Wyz => "wyz",
    Wyy => "wyy",
    Wj => "wj",
    Ww => "ww",
    Wt => "wt",
    Wd => "wd",
    Wf => "wf",
    Wn => "wn",
    Wm => "wm",
    Ws => "ws",
    Wp => "wp",
    Wb => "wb",
    Wh => "wh",
    /// 文末
    End => "end",
    /// 文頭
    Begin => "begin",
}

impl Nature {
    /// 序数を返します。
    #[inline(always)]
    pub const fn ordinal(self) -> u16 {
        self as u16
    }

    /// 序数からタグを復元します。範囲外の場合は`None`を返します。
    #[inline(always)]
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::ALL.get(ordinal).copied()
    }
}

impl FromStr for Nature {
    type Err = HanlexError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::from_tag(tag).ok_or_else(|| {
            HanlexError::invalid_argument("nature", format!("unknown part-of-speech tag {tag:?}"))
        })
    }
}

impl fmt::Display for Nature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
