//! Embedded NSI installer script.
//!
//! The script has no build-time substitutions. Every path and name is read
//! from the environment of the `makensis` process with `$%VAR%`, so one fixed
//! script serves every project.

pub const NSI_TEMPLATE: &str = r#"Unicode true
SetCompressor /SOLID lzma

!define APP_NAME "$%NAME%"
!define APP_VERSION "$%VERSION%"

!include "MUI2.nsh"

Name "${APP_NAME}"
OutFile "$%OUTPUT_FILE%"
InstallDir "$LOCALAPPDATA\${APP_NAME}"
RequestExecutionLevel user

!define MUI_ICON "$%ICON%"
!define MUI_UNICON "$%ICON%"

!insertmacro MUI_PAGE_DIRECTORY
!insertmacro MUI_PAGE_INSTFILES
!insertmacro MUI_UNPAGE_CONFIRM
!insertmacro MUI_UNPAGE_INSTFILES
!insertmacro MUI_LANGUAGE "English"

Section "Install"
  SetOutPath "$INSTDIR"
  File "$%FILE1%"
  File "$%FILE2%"
  File "$%FILE3%"
  File "$%ICON%"
  File /r "$%FLUTTER_ASSETS%"

  WriteUninstaller "$INSTDIR\uninstall.exe"
  CreateShortCut "$SMPROGRAMS\${APP_NAME}.lnk" "$INSTDIR\${APP_NAME}.exe"

  WriteRegStr HKCU "Software\Microsoft\Windows\CurrentVersion\Uninstall\${APP_NAME}" "DisplayName" "${APP_NAME}"
  WriteRegStr HKCU "Software\Microsoft\Windows\CurrentVersion\Uninstall\${APP_NAME}" "DisplayVersion" "${APP_VERSION}"
  WriteRegStr HKCU "Software\Microsoft\Windows\CurrentVersion\Uninstall\${APP_NAME}" "UninstallString" "$INSTDIR\uninstall.exe"
SectionEnd

Section "Uninstall"
  Delete "$SMPROGRAMS\${APP_NAME}.lnk"
  DeleteRegKey HKCU "Software\Microsoft\Windows\CurrentVersion\Uninstall\${APP_NAME}"
  RMDir /r "$INSTDIR"
SectionEnd
"#;
